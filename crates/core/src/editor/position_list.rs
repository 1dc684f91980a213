//! One position-list engine shared by the signature and rubric sets.
//!
//! Views are always filtered by document and page at call time. Index-based
//! callers go through [`PositionList::id_at`] and then mutate by id, so a
//! view index never outlives the view it came from.

use crate::position::{PositionKind, SignaturePosition};
use crate::types::PositionId;

#[derive(Debug, Clone, PartialEq)]
pub struct PositionList {
    kind: PositionKind,
    positions: Vec<SignaturePosition>,
}

impl PositionList {
    pub fn new(kind: PositionKind) -> Self {
        Self {
            kind,
            positions: Vec::new(),
        }
    }

    pub fn from_positions(kind: PositionKind, positions: Vec<SignaturePosition>) -> Self {
        Self { kind, positions }
    }

    pub fn kind(&self) -> PositionKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn as_slice(&self) -> &[SignaturePosition] {
        &self.positions
    }

    pub fn into_vec(self) -> Vec<SignaturePosition> {
        self.positions
    }

    /// Positions on one document page, in insertion order.
    pub fn view<'a>(
        &'a self,
        doc_key: &'a str,
        page: u32,
    ) -> impl Iterator<Item = &'a SignaturePosition> + 'a {
        self.positions.iter().filter(move |p| p.is_on(doc_key, page))
    }

    pub fn count_on(&self, doc_key: &str, page: u32) -> usize {
        self.view(doc_key, page).count()
    }

    /// Resolve a view-relative index to a stable id.
    pub fn id_at(&self, doc_key: &str, page: u32, index: usize) -> Option<PositionId> {
        self.view(doc_key, page).nth(index).map(|p| p.id)
    }

    /// View-relative index of a position, if it is on that page.
    pub fn index_in_view(&self, doc_key: &str, page: u32, id: PositionId) -> Option<usize> {
        self.view(doc_key, page).position(|p| p.id == id)
    }

    pub fn get(&self, id: PositionId) -> Option<&SignaturePosition> {
        self.positions.iter().find(|p| p.id == id)
    }

    pub fn push(&mut self, position: SignaturePosition) -> PositionId {
        let id = position.id;
        self.positions.push(position);
        id
    }

    /// Translate one position, clamped to its page. Returns `false` if the id
    /// is unknown.
    pub fn translate(&mut self, id: PositionId, dx: f64, dy: f64) -> bool {
        match self.positions.iter_mut().find(|p| p.id == id) {
            Some(position) => {
                position.translate(dx, dy);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: PositionId) -> Option<SignaturePosition> {
        let index = self.positions.iter().position(|p| p.id == id)?;
        Some(self.positions.remove(index))
    }

    /// Mark every position on one document page confirmed. Returns how many
    /// positions the view held.
    pub fn confirm_view(&mut self, doc_key: &str, page: u32) -> usize {
        let mut confirmed = 0;
        for position in self.positions.iter_mut().filter(|p| p.is_on(doc_key, page)) {
            position.position_confirmed = true;
            confirmed += 1;
        }
        confirmed
    }
}
