//! Writes `house_data.csv`: synthetic listings with the same messy free-text
//! columns the dashboard cleans (crore/lakh prices, area units, floor phrases).

use anyhow::{Context, Result};

const LOCATIONS: [&str; 6] = ["thane", "navi-mumbai", "pune", "agra", "bangalore", "gurgaon"];
const OWNERSHIP: [&str; 4] = ["Freehold", "Leasehold", "Co-operative Society", "Power Of Attorney"];
const TRANSACTION: [&str; 3] = ["Resale", "New Property", "Other"];
const STATUS: [&str; 2] = ["Ready to Move", "Under Construction"];

const ROWS: usize = 1_500;

/// splitmix64; deterministic so the sample file is reproducible.
struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.unit() * n as f64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }
}

/// `45,00,000`-style grouping used for plain rupee amounts.
fn indian_grouping(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (h, t) = rest.split_at(rest.len() - 2);
        groups.push(t);
        rest = h;
    }
    groups.push(rest);
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

fn price_text(rupees: f64, rng: &mut Rng) -> String {
    if rng.chance(0.03) {
        return "Call for Price".to_string();
    }
    if rupees >= 1e7 {
        format!("{:.2} Cr", rupees / 1e7)
    } else if rng.chance(0.15) {
        indian_grouping((rupees / 1000.0).round() as u64 * 1000)
    } else {
        format!("{:.0} Lac", rupees / 1e5)
    }
}

fn area_text(sqft: f64, rng: &mut Rng) -> String {
    let n = sqft.round() as u64;
    let unit = if rng.chance(0.1) { "sqyrd" } else { "sqft" };
    if n >= 1000 && rng.chance(0.5) {
        format!("{},{:03} {unit}", n / 1000, n % 1000)
    } else {
        format!("{n} {unit}")
    }
}

fn floor_text(rng: &mut Rng) -> String {
    let total = 2 + rng.below(30);
    match rng.below(10) {
        0 => format!("Ground out of {total}"),
        1 => "Lower Basement out of 3".to_string(),
        _ => format!("{} out of {total}", 1 + rng.below(total)),
    }
}

fn main() -> Result<()> {
    let mut rng = Rng(42);
    let output_path = "house_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    writer.write_record([
        "Index",
        "Amount(in rupees)",
        "Carpet Area",
        "Super Area",
        "Floor",
        "location",
        "Ownership",
        "Transaction",
        "Status",
    ])?;

    for index in 0..ROWS {
        let location = rng.pick(&LOCATIONS);
        let carpet = 350.0 + rng.unit() * 2_650.0;
        let rate = 4_000.0 + rng.unit() * 14_000.0;
        let price = carpet * rate;

        let carpet_area = if rng.chance(0.2) { String::new() } else { area_text(carpet, &mut rng) };
        let super_area = if rng.chance(0.4) {
            String::new()
        } else {
            area_text(carpet * 1.3, &mut rng)
        };
        let floor = if rng.chance(0.02) { String::new() } else { floor_text(&mut rng) };
        let ownership = if rng.chance(0.3) { "" } else { rng.pick(&OWNERSHIP) };

        writer.write_record([
            index.to_string(),
            price_text(price, &mut rng),
            carpet_area,
            super_area,
            floor,
            location.to_string(),
            ownership.to_string(),
            rng.pick(&TRANSACTION).to_string(),
            rng.pick(&STATUS).to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {ROWS} listings to {output_path}");
    Ok(())
}
