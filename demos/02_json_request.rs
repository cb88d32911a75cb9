/// json request - the request/response shapes exchanged with the form
use loan_schedule_rs::{generate_from_json, ScheduleConfig, ScheduleService};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== json request/response ===\n");

    let request = r#"{
        "disbursement_date": "2024-03-01",
        "principal": 50000,
        "tenure": 6,
        "interest_rate": 9.5,
        "moratorium_period": 1,
        "emi_frequency": "bi-monthly"
    }"#;

    println!("request:\n{}\n", request);
    println!("response:\n{}\n", generate_from_json(request));

    // validation failures come back as {"error": ...}
    let invalid = r#"{"disbursement_date": "2024-03-01", "principal": 50000, "tenure": 0, "interest_rate": 9.5, "emi_frequency": "monthly"}"#;
    println!("invalid request response:\n{}\n", generate_from_json(invalid));

    // a tighter configuration rejects long tenures
    let config = ScheduleConfig::from_json(r#"{"limits": {"max_tenure": 4}}"#)?;
    let response = ScheduleService::new(&config).handle(request);
    println!("with max_tenure = 4:\n{}", response.to_json());

    Ok(())
}
