/// moratorium - interest-only holiday followed by capitalization
use loan_schedule_rs::chrono::NaiveDate;
use loan_schedule_rs::{AmortizationSchedule, EmiFrequency, LoanTerms, Money};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=loan_schedule_rs=debug shows the schedule parameters
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== moratorium example ===\n");

    let terms = LoanTerms::builder()
        .disbursement_date(NaiveDate::from_ymd_opt(2024, 1, 31).ok_or("bad date")?)
        .principal(Money::from_major(100_000))
        .tenure(12)
        .interest_rate(dec!(12))
        .emi_frequency(EmiFrequency::Monthly)
        .moratorium_period(3)
        .build()?;

    let schedule = AmortizationSchedule::generate(&terms)?;

    println!("moratorium periods: {}", terms.moratorium_period());
    println!("capitalized interest: {}", schedule.capitalized_interest);
    println!("amortizing from: {}", schedule.opening_principal);
    println!("regular emi: {}\n", schedule.emi);

    println!("during moratorium:");
    for row in schedule.moratorium_installments() {
        println!("  #{} {} interest {} balance {}", row.installment_no, row.date, row.interest_component, row.remaining_principal);
    }

    println!("\nrepayment:");
    for row in schedule.amortizing_installments() {
        println!("  #{} {} emi {} principal {} interest {} balance {}",
            row.installment_no, row.date, row.emi, row.principal_component, row.interest_component, row.remaining_principal);
    }

    println!("\ntotal payable: {}", schedule.total_payment);

    Ok(())
}
