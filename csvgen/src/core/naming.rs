//! Artifact file names: 8 random bytes as 16 lowercase hex chars + `.csv`.

use rand::RngCore;

pub const ARTIFACT_EXTENSION: &str = "csv";

/// Number of random bytes behind each name.
pub const NAME_BYTES: usize = 8;

/// Build the file name for the given random bytes.
pub fn artifact_name(bytes: [u8; NAME_BYTES]) -> String {
    format!("{}.{}", hex::encode(bytes), ARTIFACT_EXTENSION)
}

/// Draw a fresh artifact name from `rng`.
pub fn random_artifact_name<R: RngCore + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; NAME_BYTES];
    rng.fill_bytes(&mut bytes);
    artifact_name(bytes)
}

/// True if `name` has the exact shape produced by [`artifact_name`].
#[cfg(test)]
pub(crate) fn is_artifact_name(name: &str) -> bool {
    let Some((stem, ext)) = name.split_once('.') else {
        return false;
    };
    ext == ARTIFACT_EXTENSION
        && stem.len() == NAME_BYTES * 2
        && stem
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn encodes_bytes_as_lowercase_hex() {
        let name = artifact_name([0x00, 0x01, 0xab, 0xcd, 0xef, 0x10, 0x99, 0xff]);
        assert_eq!(name, "0001abcdef1099ff.csv");
        assert!(is_artifact_name(&name));
    }

    #[test]
    fn random_names_have_fixed_shape_and_differ() {
        let mut rng = StdRng::seed_from_u64(7);
        let first = random_artifact_name(&mut rng);
        let second = random_artifact_name(&mut rng);
        assert!(is_artifact_name(&first), "{first}");
        assert!(is_artifact_name(&second), "{second}");
        assert_ne!(first, second);

        let thread_name = random_artifact_name(&mut rand::thread_rng());
        assert_eq!(thread_name.len(), 16 + 4);
    }

    #[test]
    fn rejects_foreign_names() {
        for name in [
            "",
            "0001abcdef1099ff",
            "0001abcdef1099ff.txt",
            "0001ABCDEF1099FF.csv",
            "0001abcdef1099f.csv",
            "0001abcdef1099ffa.csv",
            "0001abcdef1099fg.csv",
            ".csv",
        ] {
            assert!(!is_artifact_name(name), "{name:?} should be rejected");
        }
    }
}
