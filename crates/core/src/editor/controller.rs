//! In-memory position editing session for one participant.
//!
//! The editor owns copies of the participant's stored positions from
//! [`PositionEditor::open`] until [`PositionEditor::save`] or
//! [`PositionEditor::skip`] hands the merged participant back. Cancelling
//! discards the copy.

use serde::Serialize;

use crate::document::Document;
use crate::error::CoreError;
use crate::liveness::{Liveness, Ticket};
use crate::participant::{Participant, RubricOption};
use crate::position::{self, PositionKind, SignaturePosition, FIRST_PAGE};
use crate::types::PositionId;

use super::position_list::PositionList;

/// Rendered geometry of the active document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub page_count: u32,
    pub page_width: f64,
    pub page_height: f64,
}

/// Render state of the active document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum DocumentLoadState {
    Pending,
    Loaded(PageGeometry),
    /// Recoverable; the editor stays open with an empty-state affordance.
    Failed(String),
}

#[derive(Debug)]
pub struct PositionEditor {
    participant: Option<Participant>,
    documents: Vec<Document>,
    active_document_index: usize,
    current_page: u32,
    edit_mode: PositionKind,
    signature_positions: PositionList,
    rubric_positions: PositionList,
    active_position: Option<PositionId>,
    load_state: DocumentLoadState,
    liveness: Liveness,
}

impl Default for PositionEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionEditor {
    pub fn new() -> Self {
        Self {
            participant: None,
            documents: Vec::new(),
            active_document_index: 0,
            current_page: FIRST_PAGE,
            edit_mode: PositionKind::Signature,
            signature_positions: PositionList::new(PositionKind::Signature),
            rubric_positions: PositionList::new(PositionKind::Rubric),
            active_position: None,
            load_state: DocumentLoadState::Pending,
            liveness: Liveness::new(),
        }
    }

    // ---- session lifecycle ----

    /// Start editing `participant` over `documents`.
    ///
    /// Seeds both lists from the participant's stored positions, clamped to
    /// their pages. Stored positions on documents outside the set are left out.
    pub fn open(&mut self, participant: Participant, documents: Vec<Document>) {
        self.liveness.invalidate();

        let seed = |stored: &[SignaturePosition], kind: PositionKind| {
            let kept: Vec<SignaturePosition> = stored
                .iter()
                .filter(|p| documents.iter().any(|d| d.doc_key == p.doc_key))
                .cloned()
                .map(|mut p| {
                    p.clamp_to_page();
                    p
                })
                .collect();
            if kept.len() != stored.len() {
                tracing::warn!(
                    kind = kind.as_str(),
                    dropped = stored.len() - kept.len(),
                    "Ignoring stored positions on documents outside the active set"
                );
            }
            PositionList::from_positions(kind, kept)
        };

        self.signature_positions = seed(
            participant.signature_position.docs_and_position.as_slice(),
            PositionKind::Signature,
        );
        self.rubric_positions = seed(
            participant.rubric_position.docs_and_position.as_slice(),
            PositionKind::Rubric,
        );

        tracing::debug!(
            id_temp = %participant.id_temp,
            documents = documents.len(),
            signatures = self.signature_positions.len(),
            rubrics = self.rubric_positions.len(),
            "Position editor opened"
        );

        self.participant = Some(participant);
        self.documents = documents;
        self.active_document_index = 0;
        self.current_page = FIRST_PAGE;
        self.edit_mode = PositionKind::Signature;
        self.active_position = None;
        self.load_state = DocumentLoadState::Pending;
    }

    pub fn is_open(&self) -> bool {
        self.participant.is_some()
    }

    /// Merge the session lists into the participant and end the session.
    ///
    /// Returns `None` when no participant is being edited.
    pub fn save(&mut self) -> Option<Participant> {
        let mut participant = self.participant.take()?;

        let signatures = std::mem::replace(
            &mut self.signature_positions,
            PositionList::new(PositionKind::Signature),
        )
        .into_vec();
        let rubrics = std::mem::replace(
            &mut self.rubric_positions,
            PositionList::new(PositionKind::Rubric),
        )
        .into_vec();

        participant.signature_position.position_defined = !signatures.is_empty();
        participant.signature_position.docs_and_position = signatures;

        participant.rubric_position.rubric_option = if rubrics.is_empty() {
            RubricOption::NotSign
        } else {
            RubricOption::RequiredSign
        };
        participant.rubric_position.all_pages = false;
        participant.rubric_position.docs_and_position = rubrics;

        tracing::info!(
            id_temp = %participant.id_temp,
            signatures = participant.signature_position.docs_and_position.len(),
            rubrics = participant.rubric_position.docs_and_position.len(),
            "Positions saved"
        );

        self.close();
        Some(participant)
    }

    /// End the session leaving the signer to choose a position at sign time.
    pub fn skip(&mut self) -> Option<Participant> {
        let mut participant = self.participant.take()?;
        participant.signature_position.position_defined = false;
        participant.signature_position.docs_and_position.clear();
        self.close();
        Some(participant)
    }

    /// Discard the session copy.
    pub fn cancel(&mut self) {
        self.participant = None;
        self.close();
    }

    fn close(&mut self) {
        self.liveness.invalidate();
        self.signature_positions = PositionList::new(PositionKind::Signature);
        self.rubric_positions = PositionList::new(PositionKind::Rubric);
        self.documents.clear();
        self.active_position = None;
        self.load_state = DocumentLoadState::Pending;
    }

    // ---- accessors ----

    pub fn participant(&self) -> Option<&Participant> {
        self.participant.as_ref()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn active_document_index(&self) -> usize {
        self.active_document_index
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.documents.get(self.active_document_index)
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn edit_mode(&self) -> PositionKind {
        self.edit_mode
    }

    pub fn set_edit_mode(&mut self, kind: PositionKind) {
        self.edit_mode = kind;
        self.active_position = None;
    }

    pub fn load_state(&self) -> &DocumentLoadState {
        &self.load_state
    }

    pub fn positions(&self, kind: PositionKind) -> &[SignaturePosition] {
        self.list(kind).as_slice()
    }

    fn list(&self, kind: PositionKind) -> &PositionList {
        match kind {
            PositionKind::Signature => &self.signature_positions,
            PositionKind::Rubric => &self.rubric_positions,
        }
    }

    fn active_list(&self) -> &PositionList {
        self.list(self.edit_mode)
    }

    fn active_list_mut(&mut self) -> &mut PositionList {
        match self.edit_mode {
            PositionKind::Signature => &mut self.signature_positions,
            PositionKind::Rubric => &mut self.rubric_positions,
        }
    }

    fn active_doc_key(&self) -> Option<&str> {
        self.active_document().map(|d| d.doc_key.as_str())
    }

    /// Positions of the active kind on the current document page.
    pub fn visible_positions(&self) -> Vec<&SignaturePosition> {
        match self.active_doc_key() {
            Some(doc_key) => self.active_list().view(doc_key, self.current_page).collect(),
            None => Vec::new(),
        }
    }

    fn id_in_view(&self, index: usize) -> Option<PositionId> {
        let doc_key = self.active_doc_key()?;
        self.active_list().id_at(doc_key, self.current_page, index)
    }

    // ---- document and page navigation ----

    /// Switch documents; resets to the first page and waits for a new render.
    pub fn select_document(&mut self, index: usize) -> Result<(), CoreError> {
        if index >= self.documents.len() {
            return Err(CoreError::not_found("document", index.to_string()));
        }
        if index != self.active_document_index {
            self.liveness.invalidate();
            self.active_document_index = index;
            self.current_page = FIRST_PAGE;
            self.active_position = None;
            self.load_state = DocumentLoadState::Pending;
        }
        Ok(())
    }

    /// Known page count of the active document, if rendered.
    pub fn page_count(&self) -> Option<u32> {
        match &self.load_state {
            DocumentLoadState::Loaded(geometry) => Some(geometry.page_count),
            _ => self.active_document().and_then(|d| d.page_count),
        }
    }

    pub fn go_to_page(&mut self, page: u32) -> Result<(), CoreError> {
        position::validate_page_number(page)?;
        if let Some(count) = self.page_count() {
            if page > count {
                return Err(CoreError::Validation(format!(
                    "page {page} is past the last page ({count})"
                )));
            }
        }
        self.current_page = page;
        self.active_position = None;
        Ok(())
    }

    pub fn next_page(&mut self) -> bool {
        self.current_page
            .checked_add(1)
            .is_some_and(|page| self.go_to_page(page).is_ok())
    }

    pub fn previous_page(&mut self) -> bool {
        self.current_page > FIRST_PAGE && self.go_to_page(self.current_page - 1).is_ok()
    }

    /// Issue a ticket for rendering the active document. Tickets from earlier
    /// attempts become stale.
    pub fn begin_document_load(&mut self) -> Ticket {
        self.load_state = DocumentLoadState::Pending;
        self.liveness.invalidate();
        self.liveness.ticket()
    }

    /// Record rendered geometry. Returns `Ok(false)` when the ticket is stale
    /// and the result was discarded.
    pub fn document_loaded(
        &mut self,
        ticket: &Ticket,
        geometry: PageGeometry,
    ) -> Result<bool, CoreError> {
        if !ticket.is_current() {
            tracing::debug!("Discarding render result for a stale document");
            return Ok(false);
        }
        position::validate_page_geometry(geometry.page_width, geometry.page_height)?;
        if geometry.page_count < FIRST_PAGE {
            return Err(CoreError::Validation("document has no pages".to_string()));
        }

        if let Some(document) = self.documents.get_mut(self.active_document_index) {
            document.page_count = Some(geometry.page_count);
        }
        self.current_page = self.current_page.min(geometry.page_count);
        self.load_state = DocumentLoadState::Loaded(geometry);
        Ok(true)
    }

    /// Record a render failure. Positions are kept; returns `false` when the
    /// ticket is stale.
    pub fn document_failed(&mut self, ticket: &Ticket, reason: impl Into<String>) -> bool {
        if !ticket.is_current() {
            return false;
        }
        let reason = reason.into();
        tracing::warn!(
            doc_key = self.active_doc_key().unwrap_or_default(),
            reason = %reason,
            "Document could not be rendered"
        );
        self.load_state = DocumentLoadState::Failed(reason);
        true
    }

    // ---- position editing ----

    /// Add the default rectangle to the active list on the current page.
    pub fn add_position(&mut self) -> Result<PositionId, CoreError> {
        let participant_id = self
            .participant
            .as_ref()
            .map(|p| p.id_temp.clone())
            .ok_or(CoreError::NotReady("no participant is being edited"))?;
        let doc_key = self
            .active_doc_key()
            .map(str::to_owned)
            .ok_or(CoreError::NotReady("no document is selected"))?;
        let geometry = match &self.load_state {
            DocumentLoadState::Loaded(geometry) => *geometry,
            _ => return Err(CoreError::NotReady("the document has not been rendered")),
        };

        let position = SignaturePosition::new_default(
            doc_key,
            self.current_page,
            geometry.page_width,
            geometry.page_height,
            participant_id,
        )?;
        Ok(self.active_list_mut().push(position))
    }

    /// Translate the `index`-th position of the current view.
    pub fn move_position(&mut self, index: usize, dx: f64, dy: f64) -> bool {
        match self.id_in_view(index) {
            Some(id) => self.active_list_mut().translate(id, dx, dy),
            None => false,
        }
    }

    pub fn move_position_by_id(&mut self, id: PositionId, dx: f64, dy: f64) -> bool {
        self.active_list_mut().translate(id, dx, dy)
    }

    /// Remove the `index`-th position of the current view.
    pub fn remove_position(&mut self, index: usize) -> Option<SignaturePosition> {
        let id = self.id_in_view(index)?;
        self.remove_position_by_id(id)
    }

    pub fn remove_position_by_id(&mut self, id: PositionId) -> Option<SignaturePosition> {
        if self.active_position == Some(id) {
            self.active_position = None;
        }
        self.active_list_mut().remove(id)
    }

    /// Confirm every position of the active kind on the current page.
    pub fn confirm_all(&mut self) -> usize {
        let page = self.current_page;
        let Some(doc_key) = self.active_doc_key().map(str::to_owned) else {
            return 0;
        };
        self.active_list_mut().confirm_view(&doc_key, page)
    }

    // ---- drag protocol ----

    /// Make the `index`-th visible position the single active one.
    pub fn begin_drag(&mut self, index: usize) -> bool {
        self.active_position = self.id_in_view(index);
        self.active_position.is_some()
    }

    pub fn drag(&mut self, dx: f64, dy: f64) -> bool {
        match self.active_position {
            Some(id) => self.move_position_by_id(id, dx, dy),
            None => false,
        }
    }

    pub fn end_drag(&mut self) {
        self.active_position = None;
    }

    /// View index of the position being dragged.
    pub fn active_position_index(&self) -> Option<usize> {
        let id = self.active_position?;
        let doc_key = self.active_doc_key()?;
        self.active_list()
            .index_in_view(doc_key, self.current_page, id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const A4: PageGeometry = PageGeometry {
        page_count: 3,
        page_width: 595.0,
        page_height: 842.0,
    };

    fn participant() -> Participant {
        let mut p = Participant::external("Ana", "ana@example.com", "52998224725");
        p.id_temp = "p-1".into();
        p
    }

    fn documents() -> Vec<Document> {
        vec![Document::new("doc-1", "a.pdf"), Document::new("doc-2", "b.pdf")]
    }

    fn loaded_editor() -> PositionEditor {
        let mut editor = PositionEditor::new();
        editor.open(participant(), documents());
        let ticket = editor.begin_document_load();
        assert!(editor.document_loaded(&ticket, A4).unwrap());
        editor
    }

    // -- open ---------------------------------------------------------------

    #[test]
    fn open_resets_navigation() {
        let mut editor = loaded_editor();
        editor.next_page();
        editor.set_edit_mode(PositionKind::Rubric);

        editor.open(participant(), documents());

        assert_eq!(editor.current_page(), 1);
        assert_eq!(editor.active_document_index(), 0);
        assert_eq!(editor.edit_mode(), PositionKind::Signature);
        assert_eq!(editor.load_state(), &DocumentLoadState::Pending);
    }

    #[test]
    fn open_is_idempotent_for_same_participant() {
        let mut editor = loaded_editor();
        editor.add_position().unwrap();
        let saved = editor.save().unwrap();

        editor.open(saved.clone(), documents());
        let first = editor.positions(PositionKind::Signature).to_vec();
        editor.open(saved, documents());
        assert_eq!(editor.positions(PositionKind::Signature), first.as_slice());
    }

    #[test]
    fn open_drops_positions_for_unknown_documents() {
        let mut p = participant();
        let stray = SignaturePosition::new_default("gone", 1, 595.0, 842.0, "p-1").unwrap();
        p.signature_position.docs_and_position.push(stray);

        let mut editor = PositionEditor::new();
        editor.open(p, documents());
        assert!(editor.positions(PositionKind::Signature).is_empty());
    }

    // -- add / move / remove ------------------------------------------------

    #[test]
    fn add_requires_rendered_document() {
        let mut editor = PositionEditor::new();
        editor.open(participant(), documents());
        assert_matches!(editor.add_position(), Err(CoreError::NotReady(_)));
    }

    #[test]
    fn add_without_participant_fails() {
        let mut editor = PositionEditor::new();
        assert_matches!(editor.add_position(), Err(CoreError::NotReady(_)));
    }

    #[test]
    fn add_goes_to_active_list() {
        let mut editor = loaded_editor();
        editor.add_position().unwrap();
        editor.set_edit_mode(PositionKind::Rubric);
        editor.add_position().unwrap();
        editor.add_position().unwrap();

        assert_eq!(editor.positions(PositionKind::Signature).len(), 1);
        assert_eq!(editor.positions(PositionKind::Rubric).len(), 2);
        let rubric = &editor.positions(PositionKind::Rubric)[0];
        assert_eq!(rubric.doc_key, "doc-1");
        assert_eq!(rubric.participant_id, "p-1");
        assert!(!rubric.position_confirmed);
    }

    #[test]
    fn move_is_clamped() {
        let mut editor = loaded_editor();
        editor.add_position().unwrap();
        assert!(editor.move_position(0, 5_000.0, -5_000.0));
        let p = &editor.positions(PositionKind::Signature)[0];
        assert_eq!((p.x, p.y), (395.0, 0.0));
    }

    #[test]
    fn oversize_stored_position_stays_on_page_after_move() {
        let mut p = participant();
        let mut stored = SignaturePosition::new_default("doc-1", 1, 200.0, 842.0, "p-1").unwrap();
        stored.x = 10.0;
        stored.width = 300.0;
        p.signature_position.docs_and_position.push(stored);
        p.signature_position.position_defined = true;

        let mut editor = PositionEditor::new();
        editor.open(p, documents());
        let ticket = editor.begin_document_load();
        editor.document_loaded(&ticket, A4).unwrap();
        assert!(editor.move_position(0, 5.0, 0.0));

        let moved = &editor.positions(PositionKind::Signature)[0];
        assert_eq!(moved.width, 200.0);
        assert!(moved.x + moved.width <= moved.doc_width);
        assert!(moved.fits_page());
    }

    #[test]
    fn move_out_of_view_index_is_noop() {
        let mut editor = loaded_editor();
        editor.add_position().unwrap();
        assert!(!editor.move_position(3, 1.0, 1.0));
    }

    #[test]
    fn remove_uses_view_index_not_absolute_index() {
        let mut editor = loaded_editor();
        let on_first = editor.add_position().unwrap();
        editor.next_page();
        let on_second_a = editor.add_position().unwrap();
        let on_second_b = editor.add_position().unwrap();

        let removed = editor.remove_position(1).unwrap();
        assert_eq!(removed.id, on_second_b);

        let remaining: Vec<PositionId> = editor
            .positions(PositionKind::Signature)
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(remaining, vec![on_first, on_second_a]);
    }

    // -- confirm ------------------------------------------------------------

    #[test]
    fn confirm_all_only_affects_current_page() {
        let mut editor = loaded_editor();
        editor.add_position().unwrap();
        editor.next_page();
        editor.add_position().unwrap();

        assert_eq!(editor.confirm_all(), 1);

        let positions = editor.positions(PositionKind::Signature);
        assert!(!positions[0].position_confirmed);
        assert!(positions[1].position_confirmed);
    }

    // -- save / skip / cancel -----------------------------------------------

    #[test]
    fn save_merges_both_lists() {
        let mut editor = loaded_editor();
        editor.add_position().unwrap();
        editor.set_edit_mode(PositionKind::Rubric);
        editor.add_position().unwrap();

        let saved = editor.save().unwrap();
        assert!(saved.signature_position.position_defined);
        assert_eq!(saved.signature_position.docs_and_position.len(), 1);
        assert_eq!(saved.rubric_position.rubric_option, RubricOption::RequiredSign);
        assert!(!saved.rubric_position.all_pages);
        assert!(!editor.is_open());
    }

    #[test]
    fn save_with_no_positions_clears_flags() {
        let mut editor = loaded_editor();
        let saved = editor.save().unwrap();
        assert!(!saved.signature_position.position_defined);
        assert_eq!(saved.rubric_position.rubric_option, RubricOption::NotSign);
    }

    #[test]
    fn save_without_participant_is_noop() {
        let mut editor = PositionEditor::new();
        assert!(editor.save().is_none());
        assert!(editor.skip().is_none());
    }

    #[test]
    fn skip_clears_signature_positions() {
        let mut editor = loaded_editor();
        editor.add_position().unwrap();
        let skipped = editor.skip().unwrap();
        assert!(!skipped.signature_position.position_defined);
        assert!(skipped.signature_position.docs_and_position.is_empty());
    }

    #[test]
    fn cancel_discards_session() {
        let mut editor = loaded_editor();
        editor.add_position().unwrap();
        editor.cancel();
        assert!(!editor.is_open());
        assert!(editor.positions(PositionKind::Signature).is_empty());
    }

    // -- navigation and loading ---------------------------------------------

    #[test]
    fn pages_are_bounded_once_count_is_known() {
        let mut editor = loaded_editor();
        assert!(!editor.previous_page());
        assert!(editor.next_page());
        assert!(editor.next_page());
        assert!(!editor.next_page());
        assert_eq!(editor.current_page(), 3);
        assert_matches!(editor.go_to_page(0), Err(CoreError::Validation(_)));
    }

    #[test]
    fn select_document_resets_page_and_load_state() {
        let mut editor = loaded_editor();
        editor.next_page();
        editor.select_document(1).unwrap();
        assert_eq!(editor.current_page(), 1);
        assert_eq!(editor.load_state(), &DocumentLoadState::Pending);
        assert_matches!(editor.select_document(2), Err(CoreError::NotFound { .. }));
    }

    #[test]
    fn stale_render_result_is_discarded() {
        let mut editor = PositionEditor::new();
        editor.open(participant(), documents());
        let stale = editor.begin_document_load();
        editor.select_document(1).unwrap();

        assert!(!editor.document_loaded(&stale, A4).unwrap());
        assert_eq!(editor.load_state(), &DocumentLoadState::Pending);
    }

    #[test]
    fn retry_supersedes_earlier_render_attempt() {
        let mut editor = PositionEditor::new();
        editor.open(participant(), documents());
        let first = editor.begin_document_load();
        let retry = editor.begin_document_load();

        assert!(editor.document_loaded(&retry, A4).unwrap());
        assert!(!editor.document_failed(&first, "late failure"));
        assert_eq!(editor.load_state(), &DocumentLoadState::Loaded(A4));
        assert!(!editor.document_loaded(&first, A4).unwrap());
    }

    #[test]
    fn next_page_stops_at_u32_max_while_count_unknown() {
        let mut editor = PositionEditor::new();
        editor.open(participant(), documents());
        editor.go_to_page(u32::MAX).unwrap();

        assert!(!editor.next_page());
        assert_eq!(editor.current_page(), u32::MAX);
    }

    #[test]
    fn render_failure_keeps_positions() {
        let mut editor = loaded_editor();
        editor.add_position().unwrap();

        let ticket = editor.begin_document_load();
        assert!(editor.document_failed(&ticket, "corrupt pdf"));
        assert_matches!(editor.load_state(), DocumentLoadState::Failed(_));
        assert_eq!(editor.positions(PositionKind::Signature).len(), 1);

        let ticket = editor.begin_document_load();
        editor.document_loaded(&ticket, A4).unwrap();
        assert_eq!(editor.visible_positions().len(), 1);
    }

    // -- drag ---------------------------------------------------------------

    #[test]
    fn drag_moves_single_active_position() {
        let mut editor = loaded_editor();
        editor.add_position().unwrap();
        editor.add_position().unwrap();

        assert!(editor.begin_drag(1));
        assert_eq!(editor.active_position_index(), Some(1));
        assert!(editor.drag(10.0, 10.0));
        editor.end_drag();
        assert!(!editor.drag(10.0, 10.0));

        let positions = editor.positions(PositionKind::Signature);
        assert_eq!((positions[0].x, positions[0].y), (50.0, 100.0));
        assert_eq!((positions[1].x, positions[1].y), (60.0, 110.0));
    }

    #[test]
    fn removing_dragged_position_clears_active() {
        let mut editor = loaded_editor();
        editor.add_position().unwrap();
        editor.begin_drag(0);
        editor.remove_position(0);
        assert_eq!(editor.active_position_index(), None);
    }
}
