//! Fill one row's missing fields from the providers, in priority order:
//! identity then attributes, then the domain guess, then the registry.
//!
//! A field that already holds a value is never overwritten, and a field set by
//! an earlier provider is never replaced by a later one. Any provider error
//! aborts the row and discards its partial changes.

use backfill_providers::{ProviderError, ProviderSet};

use crate::record::{EntityRecord, FieldChanges, TargetField};

pub fn backfill_row(
    providers: &mut ProviderSet,
    record: &EntityRecord,
) -> Result<FieldChanges, ProviderError> {
    let mut changes = FieldChanges::new();
    let name = record.name.as_str();
    if name.is_empty() {
        return Ok(changes);
    }

    if record.is_missing(TargetField::Qid) {
        if let Some(qid) = providers.identity.lookup(name)? {
            let props = providers.attributes.lookup(&qid)?;
            changes.insert(TargetField::Qid, qid);
            for (column, value) in props.iter().flat_map(|p| p.fields()) {
                let (Some(field), Some(value)) = (TargetField::from_column(column), value) else {
                    continue;
                };
                if record.is_missing(field) && !value.trim().is_empty() {
                    changes.insert(field, value.to_string());
                }
            }
        }
    }

    // Queried whenever the row lacked a website; an attribute value still wins
    if record.is_missing(TargetField::Website) {
        if let Some(website) = providers.domain.lookup(name)? {
            changes.entry(TargetField::Website).or_insert(website);
        }
    }

    if record.is_missing(TargetField::Country) {
        if let Some(country) = providers.registry.lookup(name)? {
            changes.entry(TargetField::Country).or_insert(country);
        }
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{Answer, Scripted, provider_set};
    use backfill_providers::EntityProps;

    fn acme_props() -> EntityProps {
        EntityProps {
            country: Some("France".to_string()),
            industry: Some("Retail".to_string()),
            website: Some("https://acme.fr".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn fills_from_identity_and_attributes() {
        let identity = Scripted::new("ids").answer("Acme Corp", Answer::Found("Q123".to_string()));
        let attributes = Scripted::new("attrs").answer("Q123", Answer::Found(acme_props()));
        let domain = Scripted::new("domain");
        let registry = Scripted::new("registry");
        let (domain_calls, registry_calls) = (domain.calls(), registry.calls());
        let mut set = provider_set(identity, attributes, domain, registry);

        let record = EntityRecord::new("Acme Corp");
        let changes = backfill_row(&mut set, &record).unwrap();

        assert_eq!(changes[&TargetField::Qid], "Q123");
        assert_eq!(changes[&TargetField::Country], "France");
        assert_eq!(changes[&TargetField::Industry], "Retail");
        assert_eq!(changes[&TargetField::Website], "https://acme.fr");
        assert!(!changes.contains_key(&TargetField::HqLocation));
        // Row lacked both, so the later providers are still consulted
        assert_eq!(domain_calls.list(), ["Acme Corp"]);
        assert_eq!(registry_calls.list(), ["Acme Corp"]);
    }

    #[test]
    fn domain_guess_fills_website_left_empty_by_attributes() {
        let mut set = provider_set(
            Scripted::new("ids").answer("Acme Corp", Answer::Found("Q123".to_string())),
            Scripted::new("attrs").answer(
                "Q123",
                Answer::Found(EntityProps {
                    country: Some("France".to_string()),
                    ..Default::default()
                }),
            ),
            Scripted::new("domain")
                .answer("Acme Corp", Answer::Found("https://acme.example".to_string())),
            Scripted::new("registry"),
        );

        let changes = backfill_row(&mut set, &EntityRecord::new("Acme Corp")).unwrap();
        assert_eq!(changes[&TargetField::Qid], "Q123");
        assert_eq!(changes[&TargetField::Country], "France");
        assert_eq!(changes[&TargetField::Website], "https://acme.example");
    }

    #[test]
    fn attribute_values_beat_later_providers() {
        let identity = Scripted::new("ids").answer("Acme Corp", Answer::Found("Q123".to_string()));
        let attributes = Scripted::new("attrs").answer("Q123", Answer::Found(acme_props()));
        let domain = Scripted::new("domain")
            .answer("Acme Corp", Answer::Found("https://other.example".to_string()));
        let registry =
            Scripted::new("registry").answer("Acme Corp", Answer::Found("Belgium".to_string()));
        let mut set = provider_set(identity, attributes, domain, registry);

        let changes = backfill_row(&mut set, &EntityRecord::new("Acme Corp")).unwrap();
        assert_eq!(changes[&TargetField::Website], "https://acme.fr");
        assert_eq!(changes[&TargetField::Country], "France");
    }

    #[test]
    fn existing_values_are_kept_and_skip_calls() {
        let identity = Scripted::new("ids");
        let attributes = Scripted::new("attrs");
        let domain = Scripted::new("domain");
        let registry =
            Scripted::new("registry").answer("Acme Corp", Answer::Found("Belgium".to_string()));
        let (identity_calls, domain_calls) = (identity.calls(), domain.calls());
        let mut set = provider_set(identity, attributes, domain, registry);

        let record = EntityRecord::new("Acme Corp")
            .with(TargetField::Qid, "Q1")
            .with(TargetField::Website, "https://acme.example");
        let changes = backfill_row(&mut set, &record).unwrap();

        assert!(identity_calls.list().is_empty());
        assert!(domain_calls.list().is_empty());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[&TargetField::Country], "Belgium");
    }

    #[test]
    fn attributes_do_not_overwrite_present_fields() {
        let identity = Scripted::new("ids").answer("Acme Corp", Answer::Found("Q123".to_string()));
        let attributes = Scripted::new("attrs").answer("Q123", Answer::Found(acme_props()));
        let mut set = provider_set(
            identity,
            attributes,
            Scripted::new("domain"),
            Scripted::new("registry"),
        );

        let record = EntityRecord::new("Acme Corp").with(TargetField::Country, "Germany");
        let changes = backfill_row(&mut set, &record).unwrap();
        assert!(!changes.contains_key(&TargetField::Country));
        assert_eq!(changes[&TargetField::Industry], "Retail");
    }

    #[test]
    fn blank_name_makes_no_calls() {
        let identity = Scripted::<String>::new("ids");
        let calls = identity.calls();
        let mut set = provider_set(
            identity,
            Scripted::new("attrs"),
            Scripted::new("domain"),
            Scripted::new("registry"),
        );
        let changes = backfill_row(&mut set, &EntityRecord::new("   ")).unwrap();
        assert!(changes.is_empty());
        assert!(calls.list().is_empty());
    }

    #[test]
    fn no_identifier_skips_attributes() {
        let attributes = Scripted::<EntityProps>::new("attrs");
        let attr_calls = attributes.calls();
        let mut set = provider_set(
            Scripted::new("ids"),
            attributes,
            Scripted::new("domain")
                .answer("Ghost", Answer::Found("https://ghost.example".to_string())),
            Scripted::new("registry"),
        );
        let changes = backfill_row(&mut set, &EntityRecord::new("Ghost")).unwrap();
        assert!(attr_calls.list().is_empty());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[&TargetField::Website], "https://ghost.example");
    }

    #[test]
    fn provider_error_discards_partial_changes() {
        let mut set = provider_set(
            Scripted::new("ids").answer("Acme Corp", Answer::Found("Q123".to_string())),
            Scripted::new("attrs").answer("Q123", Answer::Found(acme_props())),
            Scripted::new("domain"),
            Scripted::new("registry").answer("Acme Corp", Answer::Fail(500)),
        );
        let err = backfill_row(&mut set, &EntityRecord::new("Acme Corp")).unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
