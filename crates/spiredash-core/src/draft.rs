// ── Create-entry form state ──
//
// `Draft` is an immutable value: every edit returns a new `Draft` and
// leaves the receiver untouched. The selector list is shared through an
// `Arc<[SelectorRow]>`, so cloning a draft never copies rows and an edit
// only rebuilds the sequence it changes.

use std::sync::Arc;

use indexmap::IndexSet;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::error::CoreError;

/// Parent SPIFFE ID new drafts start with.
pub const DEFAULT_PARENT_ID: &str = "spiffe://example.org/spire/agent/k8s_sat/demo/default";

// ── Selector kinds ───────────────────────────────────────────────────

/// Selector types offered by the form. The server validates the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum SelectorKind {
    #[strum(serialize = "")]
    Unset,
    #[strum(serialize = "k8s:ns")]
    K8sNs,
    #[strum(serialize = "k8s:sa")]
    K8sSa,
    #[strum(serialize = "k8s:pod-label")]
    K8sPodLabel,
}

impl SelectorKind {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Text shown in the type picker.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unset => "Select type...",
            other => other.as_str(),
        }
    }

    /// Look up a kind by its wire string. Unknown strings yield `None`.
    pub fn from_wire(raw: &str) -> Option<Self> {
        Self::iter().find(|k| k.as_str() == raw)
    }

    /// Next kind in picker order, wrapping around.
    pub fn cycle_next(self) -> Self {
        let all: Vec<Self> = Self::iter().collect();
        let pos = all.iter().position(|k| *k == self).unwrap_or(0);
        all.get((pos + 1) % all.len()).copied().unwrap_or(self)
    }

    /// Previous kind in picker order, wrapping around.
    pub fn cycle_prev(self) -> Self {
        let all: Vec<Self> = Self::iter().collect();
        let pos = all.iter().position(|k| *k == self).unwrap_or(0);
        let prev = if pos == 0 { all.len() - 1 } else { pos - 1 };
        all.get(prev).copied().unwrap_or(self)
    }
}

// ── Draft ────────────────────────────────────────────────────────────

/// One selector row as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorRow {
    pub kind: String,
    pub value: String,
}

impl SelectorRow {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// Scalar text fields of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    SpiffeId,
    ParentId,
    Description,
}

impl DraftField {
    pub fn name(self) -> &'static str {
        match self {
            Self::SpiffeId => "spiffe_id",
            Self::ParentId => "parent_id",
            Self::Description => "description",
        }
    }
}

/// Which half of a selector row to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorField {
    Kind,
    Value,
}

/// In-progress "create entry" form.
///
/// Invariant: `selectors` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    spiffe_id: String,
    parent_id: String,
    selectors: Arc<[SelectorRow]>,
    site_ids: IndexSet<String>,
    description: String,
    default_parent_id: Arc<str>,
}

impl Default for Draft {
    fn default() -> Self {
        Self::seeded(DEFAULT_PARENT_ID)
    }
}

impl Draft {
    /// Fresh draft whose parent ID (and every reset) starts at `default_parent_id`.
    pub fn seeded(default_parent_id: &str) -> Self {
        Self {
            spiffe_id: String::new(),
            parent_id: default_parent_id.to_owned(),
            selectors: Arc::from([SelectorRow::new(SelectorKind::K8sNs.as_str(), "")]),
            site_ids: IndexSet::new(),
            description: String::new(),
            default_parent_id: Arc::from(default_parent_id),
        }
    }

    /// Back to the seed state, keeping the configured default parent.
    pub fn reset(&self) -> Self {
        Self::seeded(&self.default_parent_id)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn spiffe_id(&self) -> &str {
        &self.spiffe_id
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::SpiffeId => &self.spiffe_id,
            DraftField::ParentId => &self.parent_id,
            DraftField::Description => &self.description,
        }
    }

    pub fn selectors(&self) -> &[SelectorRow] {
        &self.selectors
    }

    pub fn site_ids(&self) -> &IndexSet<String> {
        &self.site_ids
    }

    pub fn is_site_selected(&self, site_id: &str) -> bool {
        self.site_ids.contains(site_id)
    }

    // ── Transitions ──────────────────────────────────────────────────

    pub fn with_field(&self, field: DraftField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        let value = value.into();
        match field {
            DraftField::SpiffeId => next.spiffe_id = value,
            DraftField::ParentId => next.parent_id = value,
            DraftField::Description => next.description = value,
        }
        next
    }

    /// Append an empty selector row.
    pub fn with_selector_row_added(&self) -> Self {
        let selectors: Arc<[SelectorRow]> = self
            .selectors
            .iter()
            .cloned()
            .chain(std::iter::once(SelectorRow::default()))
            .collect();
        Self {
            selectors,
            ..self.clone()
        }
    }

    /// Replace the type or value of the row at `index`.
    pub fn with_selector_updated(
        &self,
        index: usize,
        field: SelectorField,
        value: impl Into<String>,
    ) -> Result<Self, CoreError> {
        if index >= self.selectors.len() {
            return Err(CoreError::SelectorIndexOutOfRange {
                index,
                len: self.selectors.len(),
            });
        }
        let value = value.into();
        let selectors: Arc<[SelectorRow]> = self
            .selectors
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if i != index {
                    return row.clone();
                }
                match field {
                    SelectorField::Kind => SelectorRow::new(value.clone(), row.value.clone()),
                    SelectorField::Value => SelectorRow::new(row.kind.clone(), value.clone()),
                }
            })
            .collect();
        Ok(Self {
            selectors,
            ..self.clone()
        })
    }

    /// Add `site_id` if absent, remove it if present.
    pub fn with_site_toggled(&self, site_id: &str) -> Self {
        let mut next = self.clone();
        if !next.site_ids.shift_remove(site_id) {
            next.site_ids.insert(site_id.to_owned());
        }
        next
    }

    // ── Validation / submission ──────────────────────────────────────

    /// Name of the first empty required field, if any.
    pub fn missing_required(&self) -> Option<&'static str> {
        [DraftField::SpiffeId, DraftField::ParentId]
            .into_iter()
            .find(|f| self.field(*f).trim().is_empty())
            .map(DraftField::name)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match self.missing_required() {
            Some(field) => Err(CoreError::MissingField { field }),
            None => Ok(()),
        }
    }

    /// Request body for this draft. Fields are sent verbatim.
    pub fn to_new_entry(&self) -> spiredash_api::NewEntry {
        spiredash_api::NewEntry {
            spiffe_id: self.spiffe_id.clone(),
            parent_id: self.parent_id.clone(),
            selectors: self
                .selectors
                .iter()
                .map(|row| spiredash_api::Selector {
                    kind: row.kind.clone(),
                    value: row.value.clone(),
                })
                .collect(),
            site_ids: self.site_ids.iter().cloned().collect(),
            description: self.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_shape() {
        let draft = Draft::default();
        assert_eq!(draft.spiffe_id(), "");
        assert_eq!(draft.parent_id(), DEFAULT_PARENT_ID);
        assert_eq!(draft.selectors(), &[SelectorRow::new("k8s:ns", "")]);
        assert!(draft.site_ids().is_empty());
        assert_eq!(draft.description(), "");
    }

    #[test]
    fn reset_restores_seed_after_edits() {
        let edited = Draft::seeded("spiffe://corp.example/agent")
            .with_field(DraftField::SpiffeId, "spiffe://corp.example/web")
            .with_field(DraftField::ParentId, "spiffe://corp.example/other")
            .with_selector_row_added()
            .with_site_toggled("site-a");

        let reset = edited.reset();
        assert_eq!(reset, Draft::seeded("spiffe://corp.example/agent"));
        assert_eq!(reset.selectors().len(), 1);
        assert!(reset.site_ids().is_empty());
    }

    #[test]
    fn row_added_grows_by_one_without_touching_original() {
        let original = Draft::default()
            .with_selector_updated(0, SelectorField::Value, "prod")
            .unwrap();
        let grown = original.with_selector_row_added();

        assert_eq!(original.selectors().len(), 1);
        assert_eq!(grown.selectors().len(), 2);
        assert_eq!(grown.selectors()[0], original.selectors()[0]);
        assert_eq!(grown.selectors()[1], SelectorRow::default());
    }

    #[test]
    fn selector_update_touches_only_one_row() {
        let draft = Draft::default().with_selector_row_added();
        let updated = draft
            .with_selector_updated(1, SelectorField::Kind, "k8s:sa")
            .unwrap()
            .with_selector_updated(1, SelectorField::Value, "web")
            .unwrap();

        assert_eq!(updated.selectors()[0], draft.selectors()[0]);
        assert_eq!(updated.selectors()[1], SelectorRow::new("k8s:sa", "web"));
        assert_eq!(draft.selectors()[1], SelectorRow::default());
    }

    #[test]
    fn selector_update_out_of_range() {
        let err = Draft::default()
            .with_selector_updated(3, SelectorField::Value, "x")
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::SelectorIndexOutOfRange { index: 3, len: 1 }
        ));
    }

    #[test]
    fn site_toggle_is_an_involution() {
        let draft = Draft::default().with_site_toggled("site-a");
        for site in ["site-a", "site-b", "site-c"] {
            assert_eq!(draft.with_site_toggled(site).with_site_toggled(site), draft);
        }
        assert!(draft.is_site_selected("site-a"));
        assert!(!draft.with_site_toggled("site-a").is_site_selected("site-a"));
    }

    #[test]
    fn missing_required_reports_first_empty_field() {
        assert_eq!(Draft::default().missing_required(), Some("spiffe_id"));

        let no_parent = Draft::default()
            .with_field(DraftField::SpiffeId, "spiffe://example.org/web")
            .with_field(DraftField::ParentId, "  ");
        assert_eq!(no_parent.missing_required(), Some("parent_id"));
        assert!(matches!(
            no_parent.validate(),
            Err(CoreError::MissingField { field: "parent_id" })
        ));

        let complete = no_parent.with_field(DraftField::ParentId, DEFAULT_PARENT_ID);
        assert!(complete.validate().is_ok());
    }

    #[test]
    fn new_entry_carries_fields_verbatim() {
        let draft = Draft::default()
            .with_field(DraftField::SpiffeId, "spiffe://example.org/web")
            .with_selector_updated(0, SelectorField::Value, "prod")
            .unwrap()
            .with_site_toggled("site-b")
            .with_site_toggled("site-a");

        let entry = draft.to_new_entry();
        assert_eq!(entry.spiffe_id, "spiffe://example.org/web");
        assert_eq!(entry.parent_id, DEFAULT_PARENT_ID);
        assert_eq!(entry.selectors.len(), 1);
        assert_eq!(entry.selectors[0].kind, "k8s:ns");
        assert_eq!(entry.selectors[0].value, "prod");
        assert_eq!(entry.site_ids, vec!["site-b".to_owned(), "site-a".to_owned()]);
    }

    #[test]
    fn selector_kind_cycles_and_round_trips() {
        assert_eq!(SelectorKind::Unset.cycle_next(), SelectorKind::K8sNs);
        assert_eq!(SelectorKind::K8sPodLabel.cycle_next(), SelectorKind::Unset);
        assert_eq!(SelectorKind::Unset.cycle_prev(), SelectorKind::K8sPodLabel);
        assert_eq!(SelectorKind::from_wire("k8s:sa"), Some(SelectorKind::K8sSa));
        assert_eq!(SelectorKind::from_wire("unix:uid"), None);
        assert_eq!(SelectorKind::Unset.label(), "Select type...");
    }
}
