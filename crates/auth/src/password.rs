//! Passwort-Hashing mit Argon2id
//!
//! Jeder Hash traegt ein frisches Zufalls-Salt und wird als PHC-String
//! gespeichert. Ein falsches Passwort ist KEIN Fehler, sondern `Ok(false)`;
//! nur ein unlesbarer Hash ist ein Fehler.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};

use crate::error::AuthError;

/// Argon2id-Parameter gemaess OWASP-Empfehlungen:
/// 64 MiB Speicher, 3 Iterationen, 1 Thread
fn argon2_instanz() -> Argon2<'static> {
    let params = Params::new(64 * 1024, 3, 1, None).expect("Argon2-Parameter ungueltig");
    Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params)
}

/// Hasht ein Passwort mit Argon2id und einem zufaelligen Salt
///
/// Gibt den PHC-String zurueck (inkl. Algorithmus, Parameter und Salt).
pub fn passwort_hashen(passwort: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    argon2_instanz()
        .hash_password(passwort.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswortHashing(e.to_string()))
}

/// Verifiziert ein Passwort gegen einen gespeicherten PHC-Hash
///
/// Der Vergleich laeuft in konstanter Zeit (argon2-Crate).
pub fn passwort_verifizieren(passwort: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::PasswortHashing(format!("Ungueltiges Hash-Format: {e}")))?;

    match argon2_instanz().verify_password(passwort.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::PasswortHashing(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwort_hashen_und_verifizieren() {
        let passwort = "sicheres_passwort_123!";
        let hash = passwort_hashen(passwort).expect("Hashing fehlgeschlagen");

        assert!(hash.starts_with("$argon2id$"), "Hash muss PHC-Format haben");

        let korrekt = passwort_verifizieren(passwort, &hash).expect("Verifikation fehlgeschlagen");
        assert!(korrekt);
    }

    #[test]
    fn falsches_passwort_ist_false_kein_fehler() {
        let hash = passwort_hashen("richtiges_passwort").unwrap();

        let korrekt = passwort_verifizieren("falsches_passwort", &hash)
            .expect("Mismatch darf kein Fehler sein");
        assert!(!korrekt);
    }

    #[test]
    fn gleiche_passwoerter_unterschiedliche_hashes() {
        let hash1 = passwort_hashen("gleiches_passwort").unwrap();
        let hash2 = passwort_hashen("gleiches_passwort").unwrap();

        assert_ne!(hash1, hash2, "Salt muss pro Aufruf zufaellig sein");
    }

    #[test]
    fn ungueltiges_hash_format_gibt_fehler() {
        let ergebnis = passwort_verifizieren("passwort", "kein_gueltiger_hash");
        assert!(matches!(ergebnis, Err(AuthError::PasswortHashing(_))));
    }
}
