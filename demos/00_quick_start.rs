/// quick start - minimal example to get started
use loan_schedule_rs::chrono::NaiveDate;
use loan_schedule_rs::{generate_schedule, LoanTerms, Money};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // a 100,000 loan at 12% a year, repaid monthly over a year
    let terms = LoanTerms::builder()
        .disbursement_date(NaiveDate::from_ymd_opt(2024, 1, 15).ok_or("bad date")?)
        .principal(Money::from_major(100_000))
        .tenure(12)
        .interest_rate(dec!(12))
        .build()?;

    let schedule = generate_schedule(&terms)?;

    println!("emi: {}", schedule.emi);
    for row in &schedule.installments {
        println!(
            "{:>3}  {}  {:>10}  {:>10}  {:>9}  {:>10}",
            row.installment_no,
            row.date,
            row.emi,
            row.principal_component,
            row.interest_component,
            row.remaining_principal
        );
    }
    println!("total interest: {}", schedule.total_interest);

    Ok(())
}
