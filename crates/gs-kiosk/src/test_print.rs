//! `--test-print`: print a random sample order
//!
//! Exercises the renderer and printer without the browser or the LLM.

use gs_core::{Config, OrderRecord};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::error::Result;
use crate::output::{ReceiptOutput, ThermalOutput};

const SAMPLE_NAMES: &[&str] = &[
    "지수", "민준", "서연", "하준", "서준", "도윤", "예준", "시우", "주원", "하은",
];

/// (type number, persona, drink, food)
const SAMPLE_TYPES: &[(u8, &str, &str, &str)] = &[
    (1, "Bold Creator", "Negroni", "코랄 소스의 랍스터 테일"),
    (2, "Unexpected Innovator", "Negroni", "파가든 브리오쉬 한우 버거"),
    (3, "Future Seeker", "Negroni", "아보카도 리코타 치즈 토스트"),
    (4, "Experience Architect", "Grapefruit Blossom", "망고 크림 새우"),
    (5, "Harmony Seeker", "Grapefruit Blossom", "고르곤졸라 피자"),
    (6, "Curious Explorer", "Grapefruit Blossom", "와사비 젤리 허브 연어"),
    (7, "Positive Giver", "Fuzzy Navel", "아보카도 리코타 치즈 토스트"),
    (8, "Cozy Connector", "Fuzzy Navel", "고르곤졸라 피자"),
];

/// Random name and persona type
pub fn sample_order<R: Rng + ?Sized>(rng: &mut R) -> OrderRecord {
    let name = SAMPLE_NAMES.choose(rng).copied().unwrap_or("지수");
    let (number, persona, drink, food) = SAMPLE_TYPES
        .choose(rng)
        .copied()
        .unwrap_or(SAMPLE_TYPES[0]);

    OrderRecord::new(name, format!("{} + {}", drink, food))
        .with_notes(persona)
        .with_type_number(number)
}

pub fn run(config: &Config) -> Result<()> {
    let record = sample_order(&mut rand::thread_rng());
    info!(
        "Test order: {} / {} (type {:?})",
        record.name, record.item, record.type_number
    );

    if let Some(path) = &config.receipt.debug_record {
        if let Err(e) = record.save_json(path) {
            warn!("Failed to write {}: {}", path, e);
        }
    }

    let output = ThermalOutput::from_config(&config.receipt, &config.printer)?;
    output.print(&record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_sample_order_is_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let record = sample_order(&mut rng);
            record.validate().unwrap();
            assert!(SAMPLE_NAMES.contains(&record.name.as_str()));
            assert!(matches!(record.type_number, Some(1..=8)));
        }
    }

    #[test]
    fn test_sample_item_matches_persona() {
        let mut rng = StdRng::seed_from_u64(42);
        let record = sample_order(&mut rng);
        let number = record.type_number.unwrap();
        let (_, persona, drink, _) = SAMPLE_TYPES[number as usize - 1];

        assert_eq!(record.notes, persona);
        assert!(record.item.starts_with(drink));
    }
}
