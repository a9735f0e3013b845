use anyhow::{Context, Result};
use hotel_insights::calculator::{calculate_tip, format_amount};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Defaults match the calculator page: 100 baht, 10%, one person
    let bill: f64 = match args.first() {
        Some(raw) => raw.parse().with_context(|| format!("Invalid bill amount: {}", raw))?,
        None => 100.0,
    };
    let tip_percent: u32 = match args.get(1) {
        Some(raw) => raw.parse().with_context(|| format!("Invalid tip percent: {}", raw))?,
        None => 10,
    };
    let people: u32 = match args.get(2) {
        Some(raw) => raw.parse().with_context(|| format!("Invalid number of people: {}", raw))?,
        None => 1,
    };

    let breakdown = calculate_tip(bill, tip_percent, people)?;

    println!("💰 Tip Calculator");
    println!("💸 Tip:        {} baht", format_amount(breakdown.tip_amount));
    println!("💳 Total:      {} baht", format_amount(breakdown.total_amount));
    println!("👥 Per person: {} baht", format_amount(breakdown.per_person));

    Ok(())
}
