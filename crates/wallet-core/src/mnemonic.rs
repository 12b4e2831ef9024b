use bip39::{Language, Mnemonic};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::WalletError;

/// A 64-byte BIP-39 seed, wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; 64]);

impl Seed {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// Generate a BIP-39 mnemonic from fresh OS entropy.
///
/// `entropy_bits` must be one of 128, 160, 192, 224 or 256 (12 to 24 words).
pub fn generate_mnemonic(entropy_bits: usize, language: Language) -> Result<Mnemonic, WalletError> {
    if entropy_bits < 128 || entropy_bits > 256 || entropy_bits % 32 != 0 {
        return Err(WalletError::InvalidEntropyLength(entropy_bits));
    }

    let byte_len = entropy_bits / 8;
    let mut entropy = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut entropy[..byte_len]);
    let mnemonic = Mnemonic::from_entropy_in(language, &entropy[..byte_len])
        .map_err(|e| WalletError::InvalidEntropy(e.to_string()))?;
    entropy.zeroize();
    Ok(mnemonic)
}

/// Validate a mnemonic phrase against every compiled word list.
///
/// Returns the parsed mnemonic on success so callers can reuse it without a
/// second parse.
pub fn validate_mnemonic(phrase: &str) -> Result<Mnemonic, WalletError> {
    let trimmed = phrase.trim();
    if trimmed.is_empty() {
        return Err(WalletError::EmptyMnemonic);
    }

    match Mnemonic::parse_normalized(trimmed) {
        Ok(mnemonic) => Ok(mnemonic),
        // Phrases valid in more than one word list: try each candidate until
        // one also passes its checksum.
        Err(bip39::Error::AmbiguousLanguages(ambiguous)) => {
            let mut last = WalletError::MnemonicNotInWordlist;
            for language in ambiguous.iter() {
                match Mnemonic::parse_in_normalized(language, trimmed) {
                    Ok(mnemonic) => return Ok(mnemonic),
                    Err(e) => last = map_parse_error(e),
                }
            }
            Err(last)
        }
        Err(e) => Err(map_parse_error(e)),
    }
}

fn map_parse_error(err: bip39::Error) -> WalletError {
    match err {
        bip39::Error::BadWordCount(n) => {
            WalletError::InvalidEntropy(format!("bad word count: {n}"))
        }
        bip39::Error::BadEntropyBitCount(n) => {
            WalletError::InvalidEntropy(format!("bad entropy bit count: {n}"))
        }
        bip39::Error::UnknownWord(_) | bip39::Error::AmbiguousLanguages(_) => {
            WalletError::MnemonicNotInWordlist
        }
        bip39::Error::InvalidChecksum => WalletError::InvalidChecksum,
    }
}

/// Derive the 64-byte seed from a mnemonic + optional passphrase.
///
/// NFKD normalization and PBKDF2-HMAC-SHA512 (2048 rounds, salt
/// `"mnemonic" + passphrase`) per BIP-39.
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<Seed, WalletError> {
    let mnemonic = validate_mnemonic(phrase)?;
    Ok(Seed(mnemonic.to_seed(passphrase)))
}

/// Get the word list for autocomplete
pub fn word_list(language: Language) -> &'static [&'static str] {
    language.word_list()
}

/// Validate a single word against a BIP-39 word list
pub fn is_valid_word(word: &str, language: Language) -> bool {
    language.find_word(word).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generate_word_counts() {
        for (bits, words) in [(128, 12), (160, 15), (192, 18), (224, 21), (256, 24)] {
            let mnemonic = generate_mnemonic(bits, Language::English).unwrap();
            assert_eq!(mnemonic.word_count(), words);
        }
    }

    #[test]
    fn test_generate_rejects_bad_entropy_lengths() {
        for bits in [0, 96, 130, 288] {
            assert!(matches!(
                generate_mnemonic(bits, Language::English),
                Err(WalletError::InvalidEntropyLength(_))
            ));
        }
    }

    #[test]
    fn test_generate_validate_round_trip() {
        for bits in [128, 160, 192, 224, 256] {
            let mnemonic = generate_mnemonic(bits, Language::English).unwrap();
            let parsed = validate_mnemonic(&mnemonic.to_string()).unwrap();
            assert_eq!(parsed.to_string(), mnemonic.to_string());
        }
    }

    #[test]
    fn test_validate_empty_phrase() {
        assert!(matches!(
            validate_mnemonic(""),
            Err(WalletError::EmptyMnemonic)
        ));
        assert!(matches!(
            validate_mnemonic("   \t  "),
            Err(WalletError::EmptyMnemonic)
        ));
    }

    #[test]
    fn test_validate_unknown_words() {
        assert!(matches!(
            validate_mnemonic("definitely notaword whatever foo bar baz qux one two three four five"),
            Err(WalletError::MnemonicNotInWordlist)
        ));
    }

    #[test]
    fn test_validate_non_english_wordlist() {
        // Zero-entropy phrase drawn from the Italian word list (the analogue
        // of the all-"abandon" English phrase).
        let phrase =
            "abaco abaco abaco abaco abaco abaco abaco abaco abaco abaco abaco abete";
        let mnemonic = validate_mnemonic(phrase).unwrap();
        assert_eq!(mnemonic.language(), Language::Italian);
        assert_eq!(mnemonic.word_count(), 12);
    }

    #[test]
    fn test_validate_words_spanning_two_lists() {
        // Every word exists in some list, but no single list contains all of
        // them.
        let phrase = "abandon abaco abandon abaco abandon abaco \
                      abandon abaco abandon abaco abandon abaco";
        assert!(matches!(
            validate_mnemonic(phrase),
            Err(WalletError::MnemonicNotInWordlist)
        ));
    }

    #[test]
    fn test_validate_bad_checksum() {
        // Valid words, last word breaks the checksum.
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        assert!(matches!(
            validate_mnemonic(phrase),
            Err(WalletError::InvalidChecksum)
        ));
    }

    #[test]
    fn test_validate_bad_word_count() {
        assert!(matches!(
            validate_mnemonic("abandon abandon abandon"),
            Err(WalletError::InvalidEntropy(_))
        ));
    }

    #[test]
    fn test_seed_deterministic() {
        let seed1 = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        let seed2 = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        assert_eq!(seed1.as_bytes(), seed2.as_bytes());
    }

    #[test]
    fn test_passphrase_changes_seed() {
        let seed_no_pass = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        let seed_with_pass = mnemonic_to_seed(TEST_MNEMONIC, "mypassphrase").unwrap();
        assert_ne!(seed_no_pass.as_bytes(), seed_with_pass.as_bytes());
    }

    #[test]
    fn test_bip39_reference_vector() {
        let seed = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        assert_eq!(
            hex::encode(seed.as_bytes()),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1\
             9a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
    }

    #[test]
    fn test_word_list_is_2048_entries() {
        assert_eq!(word_list(Language::English).len(), 2048);
        assert_eq!(word_list(Language::English)[0], "abandon");
    }

    #[test]
    fn test_is_valid_word() {
        assert!(is_valid_word("abandon", Language::English));
        assert!(is_valid_word("zoo", Language::English));
        assert!(!is_valid_word("notaword", Language::English));
        assert!(!is_valid_word("", Language::English));
    }
}
