//! Terminal answers for classification prompts

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::io;
use tally_core::AggregateRecord;
use tally_finance::{Choice, InvalidCategorySelection, Operator};

const OTHER: &str = "Other (type a new category)";
const DETAILS: &str = "Show transactions";

#[derive(Default)]
pub struct TerminalOperator {
    theme: ColorfulTheme,
}

impl Operator for TerminalOperator {
    fn choose(&mut self, record: &AggregateRecord, categories: &[String]) -> io::Result<Choice> {
        let mut items: Vec<&str> = categories.iter().map(String::as_str).collect();
        items.push(OTHER);
        items.push(DETAILS);

        let picked = Select::with_theme(&self.theme)
            .with_prompt(format!("Category for {}", record.counterparty()))
            .items(&items)
            .default(0)
            .interact()
            .map_err(io::Error::other)?;

        Ok(match picked {
            i if i < categories.len() => Choice::Category(i),
            i if i == categories.len() => Choice::Other,
            _ => Choice::Details,
        })
    }

    fn new_category(&mut self, record: &AggregateRecord) -> io::Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(format!("New category for {}", record.counterparty()))
            .allow_empty(true)
            .interact_text()
            .map_err(io::Error::other)
    }

    fn show_details(&mut self, record: &AggregateRecord) -> io::Result<()> {
        println!("{} ({})", record.counterparty(), record.kind());
        for e in record.events() {
            println!("  {:<8}{:>12.2}", e.date, e.amount);
        }
        println!("  {:<8}{:>12.2}", "total", record.total());
        Ok(())
    }

    fn confirm(&mut self, record: &AggregateRecord, category: &str) -> io::Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(format!("Set {} as {}?", record.counterparty(), category))
            .default(true)
            .interact()
            .map_err(io::Error::other)
    }

    fn reject(&mut self, error: &InvalidCategorySelection) {
        eprintln!("Invalid input: {error}. Try again.");
    }
}
