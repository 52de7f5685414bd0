use crate::{
    codec::{self, DecodeError},
    expense::Expense,
};
use log::{debug, error, trace, warn};
use rust_decimal::Decimal;
use std::{
    fs::{self, File},
    io::{self, BufWriter, Read, Write},
    path::{Path, PathBuf},
    slice,
};
use thiserror::Error;

const TMP_SUFFIX: &str = "tmp";

/// The in-memory collection of expenses.
///
/// Insertion order is display order. The store maps onto its file as a full
/// snapshot: `load` replaces every record and `save` rewrites the whole file.
#[derive(Debug, Default)]
pub struct ExpenseStore {
    expenses: Vec<Expense>,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("could not read expenses from '{}'", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write expenses to '{}'", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// The outcome of loading a store from disk
#[derive(Debug, Default, PartialEq)]
pub struct LoadReport {
    /// Whether a file was found at all. A missing file is a first run, not an error.
    pub found: bool,
    pub loaded: usize,
    pub skipped: Vec<SkippedLine>,
}

/// A line that could not be decoded and was left out of the store
#[derive(Debug, PartialEq)]
pub struct SkippedLine {
    pub line: usize, // 1-based
    pub reason: DecodeError,
}

impl ExpenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, expense: Expense) {
        trace!("adding expense: {}", expense);
        self.expenses.push(expense);
    }

    /// Sum of every expense's amount. An empty store totals zero.
    ///
    /// Amounts are never validated, so the sum can exceed what a `Decimal` holds. In
    /// that case the total saturates at `Decimal::MAX`.
    pub fn total(&self) -> Decimal {
        let total = self
            .expenses
            .iter()
            .try_fold(Decimal::ZERO, |acc, e| acc.checked_add(e.amount()));

        match total {
            Some(total) => total,
            None => {
                warn!("expense total overflowed, reporting {}", Decimal::MAX);
                Decimal::MAX
            }
        }
    }

    /// Describe every expense, in the order they were added
    pub fn list(&self) -> Vec<String> {
        self.expenses.iter().map(Expense::describe).collect()
    }

    pub fn iter(&self) -> slice::Iter<'_, Expense> {
        self.expenses.iter()
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Write every expense to `path`, one line each.
    ///
    /// The lines are written to a temporary sibling file which is then renamed over
    /// `path`, so a failed save never leaves a half written file behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        let tmp = tmp_path(path);

        debug!(
            "saving {} expenses to {} via {}",
            self.expenses.len(),
            path.display(),
            tmp.display()
        );

        let result = self
            .write_lines(&tmp)
            .and_then(|_| fs::rename(&tmp, path));

        if let Err(source) = result {
            error!("failed to save expenses to {}: {}", path.display(), source);

            // Don't shadow the original error if there's nothing to clean up
            let _ = fs::remove_file(&tmp);

            return Err(StoreError::Write {
                path: path.to_owned(),
                source,
            });
        }

        Ok(())
    }

    fn write_lines(&self, path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for expense in &self.expenses {
            writeln!(writer, "{}", codec::encode(expense))?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()
    }

    /// Replace the store's contents with the expenses saved at `path`.
    ///
    /// If `path` can't be opened the store is left untouched and the report says
    /// nothing was found. Lines that fail to decode are skipped and listed in the
    /// report, including lines that aren't valid UTF-8; blank lines are ignored. The
    /// file is fully decoded before the current expenses are cleared, so a read error
    /// also leaves the store untouched.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport, StoreError> {
        let path = path.as_ref();

        let mut file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                debug!("no expenses loaded, could not open {}: {}", path.display(), e);
                return Ok(LoadReport::default());
            }
        };

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|source| StoreError::Read {
                path: path.to_owned(),
                source,
            })?;

        let mut expenses = Vec::new();
        let mut skipped = Vec::new();

        for (idx, line) in contents.split(|b| *b == b'\n').enumerate() {
            let line = match line.split_last() {
                Some((&b'\r', rest)) => rest,
                _ => line,
            };
            if line.iter().all(u8::is_ascii_whitespace) {
                trace!("ignoring blank line {}", idx + 1);
                continue;
            }

            match codec::decode_bytes(line) {
                Ok(expense) => expenses.push(expense),
                Err(reason) => {
                    warn!("skipping line {} of {}: {}", idx + 1, path.display(), reason);
                    skipped.push(SkippedLine {
                        line: idx + 1,
                        reason,
                    });
                }
            }
        }

        debug!(
            "loaded {} expenses from {} ({} skipped)",
            expenses.len(),
            path.display(),
            skipped.len()
        );

        let loaded = expenses.len();
        self.expenses = expenses;

        Ok(LoadReport {
            found: true,
            loaded,
            skipped,
        })
    }
}

impl<'a> IntoIterator for &'a ExpenseStore {
    type Item = &'a Expense;
    type IntoIter = slice::Iter<'a, Expense>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// E.g. "expenses.txt" becomes "expenses.txt.tmp"
fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn lunch() -> Expense {
        Expense::food(dec!(50.0), "01/05", "lunch", "fast-food")
    }

    fn taxi() -> Expense {
        Expense::travel(dec!(200.0), "02/05", "taxi", "airport")
    }

    #[test]
    fn total_empty_store() {
        assert_eq!(ExpenseStore::new().total(), Decimal::ZERO);
    }

    #[test]
    fn total_sums_amounts() {
        let mut store = ExpenseStore::new();
        store.add(Expense::food(dec!(0.1), "01/01", "", "gum"));
        store.add(Expense::food(dec!(0.2), "01/01", "", "mints"));
        store.add(Expense::travel(dec!(9999.7), "01/01", "", "Tokyo"));
        assert_eq!(store.total(), dec!(10000.0));
    }

    #[test]
    fn total_saturates_on_overflow() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut store = ExpenseStore::new();
        store.add(Expense::food(Decimal::MAX, "01/01", "", "caviar"));
        store.add(Expense::food(Decimal::MAX, "01/01", "", "caviar"));
        assert_eq!(store.total(), Decimal::MAX);
    }

    #[test]
    fn list_empty_store() {
        assert!(ExpenseStore::new().list().is_empty());
    }

    #[test]
    fn add_keeps_insertion_order_and_duplicates() {
        let mut store = ExpenseStore::new();
        store.add(taxi());
        store.add(lunch());
        store.add(taxi());

        assert_eq!(
            store.list(),
            vec![taxi().describe(), lunch().describe(), taxi().describe()]
        );
        assert_eq!(store.len(), 3);

        let mut dates = Vec::new();
        for expense in &store {
            dates.push(expense.date());
        }
        assert_eq!(dates, vec!["02/05", "01/05", "02/05"]);
    }

    #[test]
    fn add_list_total_save_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.txt");

        let mut store = ExpenseStore::new();
        store.add(lunch());
        store.add(taxi());
        assert_eq!(store.total(), dec!(250.0));
        assert_eq!(
            store.list(),
            vec![
                "[Food] Amount: 50.0 | Date: 01/05 | Description: lunch | Food Type: fast-food",
                "[Travel] Amount: 200.0 | Date: 02/05 | Description: taxi | Destination: airport",
            ]
        );

        store.save(&path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Food,50.0,01/05,lunch,fast-food\nTravel,200.0,02/05,taxi,airport\n"
        );

        let mut restored = ExpenseStore::new();
        let report = restored.load(&path).unwrap();
        assert_eq!(
            report,
            LoadReport {
                found: true,
                loaded: 2,
                skipped: Vec::new(),
            }
        );
        assert_eq!(restored.iter().collect::<Vec<_>>(), vec![&lunch(), &taxi()]);
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.txt");
        fs::write(&path, "Food,1,01/01,old,old\nFood,2,01/01,old,old\n").unwrap();

        let mut store = ExpenseStore::new();
        store.add(taxi());
        store.save(&path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Travel,200.0,02/05,taxi,airport\n"
        );
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn save_empty_store_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.txt");
        fs::write(&path, "Food,1,01/01,old,old\n").unwrap();

        ExpenseStore::new().save(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn save_unwritable_destination() {
        let _ = env_logger::builder().is_test(true).try_init();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("expenses.txt");

        let mut store = ExpenseStore::new();
        store.add(lunch());

        assert!(matches!(
            store.save(&path),
            Err(StoreError::Write { .. })
        ));
        assert_eq!(store.len(), 1);
        assert!(!path.exists());
    }

    #[test]
    fn save_failure_keeps_existing_file() {
        let _ = env_logger::builder().is_test(true).try_init();

        let dir = TempDir::new().unwrap();
        // A directory can't be replaced by a file, so the rename fails
        let path = dir.path().join("expenses.txt");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "data").unwrap();

        let mut store = ExpenseStore::new();
        store.add(lunch());

        assert!(store.save(&path).is_err());
        assert_eq!(fs::read_to_string(path.join("keep")).unwrap(), "data");
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn load_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut store = ExpenseStore::new();
        store.add(lunch());

        let report = store.load(dir.path().join("nonexistent.txt")).unwrap();
        assert_eq!(report, LoadReport::default());
        assert!(!report.found);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn load_missing_file_into_empty_store() {
        let dir = TempDir::new().unwrap();
        let mut store = ExpenseStore::new();
        store.load(dir.path().join("nonexistent.txt")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn load_skips_malformed_lines() {
        let _ = env_logger::builder().is_test(true).try_init();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.txt");
        fs::write(
            &path,
            "Food,50.0,01/05,lunch,fast-food\n\
             Food,fifty,01/05,lunch,fast-food\n\
             Travel,200.0,02/05,taxi,airport\n",
        )
        .unwrap();

        let mut store = ExpenseStore::new();
        let report = store.load(&path).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(report.loaded, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, 2);
        assert!(matches!(
            report.skipped[0].reason,
            DecodeError::InvalidAmount { .. }
        ));
        assert_eq!(store.list(), vec![lunch().describe(), taxi().describe()]);
    }

    #[test]
    fn load_skips_unknown_kinds_and_ignores_blank_lines() {
        let _ = env_logger::builder().is_test(true).try_init();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.txt");
        fs::write(
            &path,
            "Rent,900,01/05,flat,landlord\n\nTravel,200.0,02/05,taxi,airport\r\n",
        )
        .unwrap();

        let mut store = ExpenseStore::new();
        let report = store.load(&path).unwrap();

        assert_eq!(store.iter().collect::<Vec<_>>(), vec![&taxi()]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, 1);
    }

    #[test]
    fn load_replaces_existing_expenses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.txt");
        fs::write(&path, "Travel,200.0,02/05,taxi,airport\n").unwrap();

        let mut store = ExpenseStore::new();
        store.add(lunch());
        store.add(lunch());
        store.load(&path).unwrap();

        assert_eq!(store.list(), vec![taxi().describe()]);
    }

    #[test]
    fn load_skips_invalid_utf8_lines() {
        let _ = env_logger::builder().is_test(true).try_init();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.txt");
        fs::write(
            &path,
            &b"Food,50.0,01/05,lunch,fast-food\n\
               Food,1,01/01,caf\xe9,x\n\
               Travel,200.0,02/05,taxi,airport\n"[..],
        )
        .unwrap();

        let mut store = ExpenseStore::new();
        let report = store.load(&path).unwrap();

        assert_eq!(store.iter().collect::<Vec<_>>(), vec![&lunch(), &taxi()]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, 2);
        assert!(matches!(
            report.skipped[0].reason,
            DecodeError::InvalidUtf8(_)
        ));
    }

    #[test]
    fn load_unreadable_file_keeps_expenses() {
        let dir = TempDir::new().unwrap();

        let mut store = ExpenseStore::new();
        store.add(lunch());

        // Opening a directory succeeds but reading from it doesn't
        assert!(matches!(
            store.load(dir.path()),
            Err(StoreError::Read { .. })
        ));
        assert_eq!(store.list(), vec![lunch().describe()]);
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("data/expenses.txt")),
            PathBuf::from("data/expenses.txt.tmp")
        );
        assert_eq!(tmp_path(Path::new("expenses")), PathBuf::from("expenses.tmp"));
    }
}
