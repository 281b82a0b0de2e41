//! Synthetic claims data for tests.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BREEDS: [(&str, &str); 4] = [
    ("dog", "labrador"),
    ("dog", "beagle"),
    ("cat", "siamese"),
    ("cat", "persian"),
];

/// Claims filed quickly for large amounts are labelled leakage, plus a little noise.
pub fn synthetic_csv(rows: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = String::from(
        "id_loss,claim_amount,pet_breed,pet_species,owner_age,number_of_previous_claims,days_to_claim,policy_tenure,leakage_label\n",
    );
    for id in 0..rows {
        let (species, breed) = BREEDS[rng.gen_range(0..BREEDS.len())];
        let claim_amount: f64 = rng.gen_range(50.0..2000.0);
        let days_to_claim: u32 = rng.gen_range(0..60);
        let owner_age: u32 = rng.gen_range(18..80);
        let previous: u32 = rng.gen_range(0..6);
        let tenure: u32 = rng.gen_range(1..48);
        let leakage = (days_to_claim < 10 && claim_amount > 600.0) || rng.gen_bool(0.03);
        out.push_str(&format!(
            "{},{:.2},{},{},{},{},{},{},{}\n",
            1000 + id,
            claim_amount,
            breed,
            species,
            owner_age,
            previous,
            days_to_claim,
            tenure,
            u8::from(leakage)
        ));
    }
    out
}

pub fn write_synthetic_csv(path: &Path, rows: usize, seed: u64) {
    std::fs::write(path, synthetic_csv(rows, seed)).unwrap();
}
