/// Generates `rows` semicolon-separated records with a quoted text column.
pub fn generate_csv(rows: u64) -> Vec<u8> {
    let mut buffer = String::from("id;name;amount;booked\n");
    for n in 0..rows {
        buffer.push_str(&format!("{n};\"customer {n}; ltd\";{}.{:02};2024-03-{:02}\n", n * 7, n % 100, n % 28 + 1));
    }
    buffer.into_bytes()
}
