/// frequencies - the same loan under every repayment frequency
use loan_schedule_rs::chrono::NaiveDate;
use loan_schedule_rs::{generate_schedule, EmiFrequency, LoanTerms, Money, RateConverter};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== repayment frequencies ===\n");

    let disbursed = NaiveDate::from_ymd_opt(2024, 8, 31).ok_or("bad date")?;

    for frequency in EmiFrequency::ALL {
        // five years whatever the frequency
        let tenure = frequency.periods_per_year() * 5;
        let terms = LoanTerms::builder()
            .disbursement_date(disbursed)
            .principal(Money::from_major(500_000))
            .tenure(tenure)
            .interest_rate(dec!(10.5))
            .emi_frequency(frequency)
            .build()?;
        let schedule = generate_schedule(&terms)?;

        println!("{}", frequency);
        println!("  periodic rate: {}", RateConverter::for_terms(&terms));
        println!("  installments:  {}", schedule.len());
        println!("  first due:     {}", schedule.installments[0].date);
        println!("  emi:           {}", schedule.emi);
        println!("  total interest {}\n", schedule.total_interest);
    }

    Ok(())
}
