// Identifier generation for telemetry rotation

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fresh machine/device identity, generated once per rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierPair {
    pub machine_id: String,
    pub device_id: String,
}

impl IdentifierPair {
    pub fn generate() -> Self {
        Self {
            machine_id: generate_machine_id(),
            device_id: generate_device_id(),
        }
    }
}

/// 64 lowercase hex chars: two independent 128-bit random values back to back.
pub fn generate_machine_id() -> String {
    let mut rng = rand::thread_rng();
    let high: u128 = rng.gen();
    let low: u128 = rng.gen();
    format!("{:032x}{:032x}", high, low)
}

/// Random UUID v4 in canonical hyphenated lowercase form.
pub fn generate_device_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MACHINE_ID_HEX_LEN;
    use std::collections::HashSet;

    #[test]
    fn test_machine_id_shape() {
        for _ in 0..100 {
            let id = generate_machine_id();
            assert_eq!(id.len(), MACHINE_ID_HEX_LEN);
            assert!(id.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn test_device_id_is_v4() {
        let id = generate_device_id();
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(parsed.get_variant(), uuid::Variant::RFC4122);
        assert_eq!(id, id.to_lowercase());

        let groups: Vec<usize> = id.split('-').map(str::len).collect();
        assert_eq!(groups, vec![8, 4, 4, 4, 12]);
    }

    #[test]
    fn test_ids_do_not_collide() {
        let machine: HashSet<String> = (0..1000).map(|_| generate_machine_id()).collect();
        let device: HashSet<String> = (0..1000).map(|_| generate_device_id()).collect();
        assert_eq!(machine.len(), 1000);
        assert_eq!(device.len(), 1000);
    }

    #[test]
    fn test_pair_fields_are_independent() {
        let a = IdentifierPair::generate();
        let b = IdentifierPair::generate();
        assert_ne!(a, b);
        assert!(!a.machine_id.contains(&a.device_id.replace('-', "")));
    }
}
