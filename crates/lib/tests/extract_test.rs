//! # Identifier Extraction Tests

use anyhow::Result;
use policyrag::{ExtractorSet, IdentifierExtractor, IdentifierKind, RegexExtractor};

#[test]
fn test_national_id_primary_and_fallback_patterns() -> Result<()> {
    let dni = RegexExtractor::national_id()?;
    assert_eq!(dni.kind(), IdentifierKind::NationalId);
    assert_eq!(
        dni.extract("Asegurado: Ana Gomez D.N.I. 30123456 Calle 1"),
        Some("30123456".to_string())
    );
    assert_eq!(
        dni.extract("D.N.I.30123456"),
        Some("30123456".to_string())
    );
    // OCR sometimes reads the holder marker instead of the label.
    assert_eq!(
        dni.extract("Titular PRUER 27999888"),
        Some("27999888".to_string())
    );
    assert_eq!(dni.extract("DNI 30123456"), None);
    assert_eq!(dni.extract("D.N.I. 1234567"), None);
    Ok(())
}

#[test]
fn test_tax_id_patterns() -> Result<()> {
    let cuit = RegexExtractor::tax_id()?;
    assert_eq!(
        cuit.extract("C.U.I.T. 20-30123456-7 Responsable Inscripto"),
        Some("20-30123456-7".to_string())
    );
    assert_eq!(
        cuit.extract("C.U.I.T. PRUER 30-71234567-9"),
        Some("30-71234567-9".to_string())
    );
    assert_eq!(cuit.extract("CUIT 20-30123456-7"), None);
    Ok(())
}

#[test]
fn test_policy_number_patterns() -> Result<()> {
    let poliza = RegexExtractor::policy_number()?;
    assert_eq!(
        poliza.extract("PÓLIZA N° 123-45678901-00 AUTOMOTORES"),
        Some("123-45678901-00".to_string())
    );
    assert_eq!(
        poliza.extract("póliza 456-00000001-12"),
        Some("456-00000001-12".to_string())
    );
    // The label is optional: a bare number in the right shape matches.
    assert_eq!(
        poliza.extract("Ref 789-12345678-99"),
        Some("789-12345678-99".to_string())
    );
    assert_eq!(poliza.extract("Poliza 12-3456789-0"), None);
    Ok(())
}

#[test]
fn test_pattern_without_group_returns_whole_match() -> Result<()> {
    let plate = RegexExtractor::new(
        IdentifierKind::Custom("patente".to_string()),
        &[r"[A-Z]{2}\d{3}[A-Z]{2}"],
    )?;
    assert_eq!(
        plate.extract("Dominio AB123CD modelo 2021"),
        Some("AB123CD".to_string())
    );
    assert_eq!(plate.kind().field_name(), "patente");
    Ok(())
}

#[test]
fn test_invalid_pattern_is_an_error() {
    let result = RegexExtractor::new(IdentifierKind::NationalId, &[r"(\d{8}"]);
    assert!(result.is_err());
}

#[test]
fn test_extractor_set_runs_every_extractor() -> Result<()> {
    let set = ExtractorSet::insurance()?.with(RegexExtractor::new(
        IdentifierKind::Custom("patente".to_string()),
        &[r"[A-Z]{2}\d{3}[A-Z]{2}"],
    )?);
    assert_eq!(set.len(), 4);

    let text = "D.N.I. 30123456 C.U.I.T. 20-30123456-7 PÓLIZA N° 123-45678901-00 AB123CD";
    let found: Vec<(IdentifierKind, String)> = set.extract_all(text).collect();

    assert_eq!(
        found,
        vec![
            (IdentifierKind::NationalId, "30123456".to_string()),
            (IdentifierKind::TaxId, "20-30123456-7".to_string()),
            (IdentifierKind::PolicyNumber, "123-45678901-00".to_string()),
            (
                IdentifierKind::Custom("patente".to_string()),
                "AB123CD".to_string()
            ),
        ]
    );
    assert_eq!(set.extract_all("sin datos").count(), 0);
    assert!(ExtractorSet::empty().is_empty());
    Ok(())
}

#[test]
fn test_identifier_kind_field_names_round_trip() -> Result<()> {
    for kind in [
        IdentifierKind::NationalId,
        IdentifierKind::TaxId,
        IdentifierKind::PolicyNumber,
        IdentifierKind::Custom("patente".to_string()),
    ] {
        let json = serde_json::to_string(&kind)?;
        let back: IdentifierKind = serde_json::from_str(&json)?;
        assert_eq!(back, kind);
    }
    assert_eq!(serde_json::to_string(&IdentifierKind::TaxId)?, "\"cuit\"");
    Ok(())
}
