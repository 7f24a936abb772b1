//! Per-recipient template substitution.
//!
//! Fund-call and notification templates carry uppercase placeholders that
//! are substituted textually for each recipient before send. Placeholders
//! with no value for a recipient are left untouched, so a malformed
//! recipient list stays visible in the delivered mail instead of silently
//! producing empty fields.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// One bulk-send recipient with its substitution values
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
	pub email: String,
	pub nom: Option<String>,
	pub prenom: Option<String>,
	pub montant: Option<String>,
	pub date_emission: Option<String>,
	pub date_echeance: Option<String>,
	pub lot_nom: Option<String>,
}

impl Recipient {
	fn placeholders(&self) -> [(&'static str, Option<&str>); 6] {
		[
			("{NOM}", self.nom.as_deref()),
			("{PRENOM}", self.prenom.as_deref()),
			("{MONTANT}", self.montant.as_deref()),
			("{DATE_EMISSION}", self.date_emission.as_deref()),
			("{DATE_ECHEANCE}", self.date_echeance.as_deref()),
			("{LOT_NOM}", self.lot_nom.as_deref()),
		]
	}
}

/// Substitutes every placeholder occurrence for one recipient
pub fn substitute(template: &str, recipient: &Recipient) -> String {
	let mut rendered = template.to_owned();
	for (placeholder, value) in recipient.placeholders() {
		if let Some(value) = value {
			rendered = rendered.replace(placeholder, value);
		}
	}
	rendered
}

#[cfg(test)]
mod tests {
	use super::*;

	fn dupont() -> Recipient {
		Recipient {
			email: "dupont@example.com".to_string(),
			nom: Some("Dupont".to_string()),
			prenom: Some("Marie".to_string()),
			montant: Some("420,50 €".to_string()),
			date_emission: Some("01/07/2026".to_string()),
			date_echeance: Some("31/07/2026".to_string()),
			lot_nom: Some("Lot B12".to_string()),
		}
	}

	#[test]
	fn test_substitutes_all_placeholders() {
		let template = "Bonjour {PRENOM} {NOM}, appel de fonds de {MONTANT} pour {LOT_NOM}, \
			émis le {DATE_EMISSION}, à régler avant le {DATE_ECHEANCE}.";
		let rendered = substitute(template, &dupont());
		assert_eq!(
			rendered,
			"Bonjour Marie Dupont, appel de fonds de 420,50 € pour Lot B12, \
			émis le 01/07/2026, à régler avant le 31/07/2026."
		);
	}

	#[test]
	fn test_substitutes_every_occurrence() {
		let rendered = substitute("{NOM} / {NOM} / {NOM}", &dupont());
		assert_eq!(rendered, "Dupont / Dupont / Dupont");
	}

	#[test]
	fn test_missing_values_leave_placeholder_untouched() {
		let mut recipient = dupont();
		recipient.montant = None;
		let rendered = substitute("Montant: {MONTANT}", &recipient);
		assert_eq!(rendered, "Montant: {MONTANT}");
	}

	#[test]
	fn test_unknown_placeholders_pass_through() {
		let rendered = substitute("{NOM} {UNKNOWN}", &dupont());
		assert_eq!(rendered, "Dupont {UNKNOWN}");
	}

	#[test]
	fn test_recipient_wire_format() {
		let json = r#"{"email":"a@b.fr","nom":"Durand","dateEmission":"01/08/2026"}"#;
		let recipient: Recipient = serde_json::from_str(json).unwrap();
		assert_eq!(recipient.nom.as_deref(), Some("Durand"));
		assert_eq!(recipient.date_emission.as_deref(), Some("01/08/2026"));
		assert!(recipient.prenom.is_none());
	}
}

// vim: ts=4
