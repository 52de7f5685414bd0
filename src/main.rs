use chrono::Local;
use expense_tracker::{codec, Config, ExpenseTracker, KindTag, StoreError};
use log::error;
use rust_decimal::Decimal;
use std::{
    io::{self, BufRead, Write},
    process,
};

const MENU: &str = "
==== Smart Expense Tracker ====
1. Add Food Expense
2. Add Travel Expense
3. View All Expenses
4. View Total Expenses
5. Get Budget Advice
0. Exit";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut tracker = ExpenseTracker::new(Config::default());

    // If the saved expenses couldn't be read, saving on exit would replace them with
    // whatever was entered this session.
    let loaded = match tracker.load_on_startup() {
        Ok(_) => true,
        Err(e) => {
            error!("{}", e);
            eprintln!("Could not load saved expenses: {}", e);
            false
        }
    };

    let stdin = io::stdin();
    if let Err(e) = run(&mut stdin.lock(), &mut tracker, loaded) {
        eprintln!("Could not save expenses: {}", e);
        process::exit(1);
    }
}

/// Run the menu until the user exits or input runs out, saving on the way out.
///
/// When `loaded` is false the data file is only overwritten if the user agrees.
fn run<R: BufRead>(
    input: &mut R,
    tracker: &mut ExpenseTracker,
    loaded: bool,
) -> Result<(), StoreError> {
    loop {
        println!("{}", MENU);

        // End of input is treated as a request to exit
        let choice = prompt(input, "Enter choice: ").unwrap_or_else(|| "0".into());

        match choice.as_str() {
            "1" => add_expense(input, tracker, KindTag::Food),
            "2" => add_expense(input, tracker, KindTag::Travel),
            "3" => list_expenses(tracker),
            "4" => println!("Total Expenses: {}", tracker.total_expenses()),
            "5" => {
                println!("\n--- Budget Analysis ---");
                println!("{}", tracker.budget_verdict());
            }
            "0" => {
                if loaded || confirm_overwrite(input, tracker) {
                    tracker.save_on_exit()?;
                    println!("Data saved. Goodbye!");
                } else {
                    println!("Data not saved. Goodbye!");
                }
                return Ok(());
            }
            _ => println!("Invalid choice! Try again."),
        }
    }
}

fn confirm_overwrite<R: BufRead>(input: &mut R, tracker: &ExpenseTracker) -> bool {
    let message = format!(
        "Saved expenses in {} could not be loaded. Overwrite them? [y/N]: ",
        tracker.config().data_file().display()
    );

    match prompt(input, &message) {
        Some(answer) => matches!(answer.to_lowercase().as_str(), "y" | "yes"),
        None => false,
    }
}

fn add_expense<R: BufRead>(input: &mut R, tracker: &mut ExpenseTracker, tag: KindTag) {
    let amount = match prompt_amount(input) {
        Some(amount) => amount,
        None => return,
    };

    let date = match prompt(input, "Enter date (DD/MM, blank for today): ") {
        Some(date) if date.is_empty() => today(),
        Some(date) => date,
        None => return,
    };

    let description = match prompt(input, "Enter description: ") {
        Some(description) => description,
        None => return,
    };

    let attribute = match prompt(input, &format!("Enter {}: ", tag.label().to_lowercase())) {
        Some(attribute) => attribute,
        None => return,
    };

    match tag {
        KindTag::Food => tracker.add_food_expense(amount, date, description, attribute),
        KindTag::Travel => tracker.add_travel_expense(amount, date, description, attribute),
    }
}

fn list_expenses(tracker: &ExpenseTracker) {
    println!("\n--- All Expenses ---");

    let expenses = tracker.list_all_expenses();
    if expenses.is_empty() {
        println!("No expenses recorded.");
    }
    for expense in expenses {
        println!("{}", expense);
    }
}

fn today() -> String {
    Local::now().format("%d/%m").to_string()
}

// Keep asking until we get a number or run out of input
fn prompt_amount<R: BufRead>(input: &mut R) -> Option<Decimal> {
    loop {
        let raw = prompt(input, "Enter amount: ")?;
        match codec::parse_amount(&raw) {
            Ok(amount) => return Some(amount),
            Err(e) => println!("{}, please try again.", e),
        }
    }
}

/// Print `message` and read one trimmed line. Returns `None` at end of input.
fn prompt<R: BufRead>(input: &mut R, message: &str) -> Option<String> {
    print!("{}", message);
    let _ = io::stdout().flush();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_string()),
        Err(e) => {
            error!("failed to read input: {}", e);
            None
        }
    }
}
