//! General utility helper functions
//!
//! Name generation for sample resources and storage size conversions.

use rand::seq::SliceRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "autumn", "hidden", "bitter", "misty", "silent", "empty", "dry", "dark", "summer", "icy",
    "delicate", "quiet", "white", "cool", "spring", "winter", "patient", "twilight", "dawn",
    "crimson", "wispy", "weathered", "blue", "billowing", "broken", "cold", "damp", "falling",
    "frosty", "green", "long", "late", "lingering", "bold", "little", "morning", "muddy", "old",
    "red", "rough", "still", "small", "sparkling", "shy", "wandering", "withered", "wild",
    "black", "young", "holy", "solitary", "fragrant", "aged", "snowy", "proud", "floral",
    "restless", "divine", "polished", "ancient", "purple", "lively", "nameless",
];

const NOUNS: &[&str] = &[
    "waterfall", "river", "breeze", "moon", "rain", "wind", "sea", "morning", "snow", "lake",
    "sunset", "pine", "shadow", "leaf", "dawn", "glitter", "forest", "hill", "cloud", "meadow",
    "sun", "glade", "bird", "brook", "butterfly", "bush", "dew", "dust", "field", "fire",
    "flower", "firefly", "feather", "grass", "haze", "mountain", "night", "pond", "darkness",
    "snowflake", "silence", "sound", "sky", "shape", "surf", "thunder", "violet", "water",
    "wildflower", "wave", "resonance", "wood", "dream", "cherry", "tree", "fog", "frost",
    "voice", "paper", "frog", "smoke", "star",
];

/// Bytes in one gibibyte
pub const GIB: u64 = 1024 * 1024 * 1024;

/// Bytes in one tebibyte
pub const TIB: u64 = 1024 * GIB;

/// Generate a random, human readable resource name such as `misty-lake-4821`
pub fn generate_resource_name() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("quiet");
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or("lake");
    let token: u16 = rng.gen_range(1000..10000);
    format!("{adjective}-{noun}-{token}")
}

/// Convert tebibytes to bytes
pub fn tib_to_bytes(size: u64) -> u64 {
    size * TIB
}

/// Convert gibibytes to bytes
pub fn gib_to_bytes(size: u64) -> u64 {
    size * GIB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_name_shape() {
        let name = generate_resource_name();
        let parts: Vec<&str> = name.split('-').collect();
        assert_eq!(parts.len(), 3, "unexpected name: {name}");
        assert!(ADJECTIVES.contains(&parts[0]));
        assert!(NOUNS.contains(&parts[1]));
        assert!(parts[2].parse::<u16>().is_ok());
    }

    #[test]
    fn test_size_conversions() {
        assert_eq!(tib_to_bytes(4), 4_398_046_511_104);
        assert_eq!(gib_to_bytes(100), 107_374_182_400);
    }
}
