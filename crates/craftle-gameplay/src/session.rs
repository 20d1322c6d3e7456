//! Puzzle session management.
//!
//! A [`PuzzleSession`] owns one game: the hidden target recipe, the player's
//! crafting grid, the attempt counter, and the outcome state machine:
//!
//! ```text
//! InProgress ──(target crafted)──▶ Solved
//!     │
//!     └──(attempts == max)──────▶ Exhausted
//! ```
//!
//! Terminal states reject every mutating call with
//! [`SessionError::InvalidState`].

use std::sync::Arc;

use chrono::NaiveDate;
use craftle_common::{CatalogError, ItemId, RecipeId};
use craftle_kernel::catalog::Catalog;
use craftle_kernel::crafting_grid::CraftingGrid;
use craftle_kernel::recipe::Recipe;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::daily::{select_target, PuzzleMode};

/// Attempts allowed per puzzle.
pub const MAX_ATTEMPTS: u32 = 27;

// ============================================================================
// Session State
// ============================================================================

/// Outcome state of a puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Still guessing.
    #[default]
    InProgress,
    /// The target recipe was crafted.
    Solved,
    /// All attempts used without crafting the target.
    Exhausted,
}

impl SessionState {
    /// Check if the game has ended.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Solved | Self::Exhausted)
    }
}

// ============================================================================
// Outcomes and Events
// ============================================================================

/// Result of [`PuzzleSession::attempt_craft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CraftOutcome {
    /// The grid matches no recipe; nothing was consumed.
    NoMatch,
    /// A recipe other than the target was crafted.
    Continue {
        /// Attempt number just used (1-based).
        attempt: u32,
        /// Item that was crafted.
        crafted: ItemId,
    },
    /// The target was crafted.
    Solved {
        /// Attempts used, including the winning one.
        attempts: u32,
    },
    /// The last attempt was used without crafting the target.
    Exhausted {
        /// Attempts used.
        attempts: u32,
    },
}

/// One recorded craft attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Attempt number (1-based).
    pub attempt: u32,
    /// Recipe that produced the item.
    pub recipe: RecipeId,
    /// Item that was crafted.
    pub crafted: ItemId,
    /// Whether this attempt solved the puzzle.
    pub correct: bool,
}

/// Events emitted by a session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A grid cell changed.
    CellChanged {
        /// Cell index (0..9, row-major).
        index: usize,
        /// New content.
        item: Option<ItemId>,
    },
    /// An attempt was recorded.
    AttemptRecorded(AttemptRecord),
    /// Session state changed.
    StateChanged {
        /// Previous state.
        from: SessionState,
        /// New state.
        to: SessionState,
    },
}

// ============================================================================
// Session Errors
// ============================================================================

/// Session operation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Operation is not allowed once the game has ended.
    #[error("Session is {0:?}; no further moves are accepted")]
    InvalidState(SessionState),
    /// Cell index outside the 3×3 grid.
    #[error("Invalid grid cell: {0}")]
    InvalidCell(usize),
    /// No recipes to choose a target from.
    #[error("Catalog has no recipes")]
    EmptyCatalog,
    /// Catalog lookup failure.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

// ============================================================================
// Puzzle Session
// ============================================================================

/// A single puzzle game.
#[derive(Debug)]
pub struct PuzzleSession {
    /// Shared read-only catalog.
    catalog: Arc<Catalog>,
    /// Hidden target recipe.
    target: Recipe,
    /// Player's crafting grid.
    grid: CraftingGrid,
    /// Attempts used so far.
    attempts: u32,
    /// Attempt limit.
    max_attempts: u32,
    /// Outcome state.
    state: SessionState,
    /// Every valid attempt, oldest first.
    history: Vec<AttemptRecord>,
    /// Pending events.
    events: Vec<SessionEvent>,
}

impl PuzzleSession {
    /// Start a session with a specific target recipe.
    pub fn new(catalog: Arc<Catalog>, target: RecipeId) -> SessionResult<Self> {
        let target = catalog.recipe(target)?.clone();
        info!("New puzzle started ({} recipes)", catalog.len());
        debug!("Target is {} -> {}", target.id, target.result.item);

        Ok(Self {
            catalog,
            target,
            grid: CraftingGrid::new(),
            attempts: 0,
            max_attempts: MAX_ATTEMPTS,
            state: SessionState::InProgress,
            history: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Start a session whose target is chosen by `mode`.
    pub fn start(catalog: Arc<Catalog>, mode: PuzzleMode, date: NaiveDate) -> SessionResult<Self> {
        let target = select_target(mode, date, catalog.recipes())
            .map(|recipe| recipe.id)
            .ok_or(SessionError::EmptyCatalog)?;
        Self::new(catalog, target)
    }

    /// Start today's puzzle for `date`.
    pub fn daily(catalog: Arc<Catalog>, date: NaiveDate) -> SessionResult<Self> {
        Self::start(catalog, PuzzleMode::Daily, date)
    }

    /// Start a practice puzzle with a random target.
    pub fn random(catalog: Arc<Catalog>, date: NaiveDate) -> SessionResult<Self> {
        Self::start(catalog, PuzzleMode::Random, date)
    }

    /// Override the attempt limit (at least one attempt).
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Current outcome state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if the game has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Attempts used so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Attempt limit.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Attempts still available.
    #[must_use]
    pub fn attempts_remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }

    /// The player's crafting grid.
    #[must_use]
    pub fn grid(&self) -> &CraftingGrid {
        &self.grid
    }

    /// The shared catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The target recipe. Presentation layers should only reveal it once the
    /// session is finished.
    #[must_use]
    pub fn target(&self) -> &Recipe {
        &self.target
    }

    /// Every valid attempt, oldest first.
    #[must_use]
    pub fn history(&self) -> &[AttemptRecord] {
        &self.history
    }

    /// Take pending events.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Place an item in a cell, or clear it with `None`.
    pub fn set_cell(&mut self, index: usize, item: Option<ItemId>) -> SessionResult<()> {
        self.ensure_in_progress()?;
        if !self.grid.set(index, item.clone()) {
            return Err(SessionError::InvalidCell(index));
        }
        self.events.push(SessionEvent::CellChanged { index, item });
        Ok(())
    }

    /// Remove every item from the grid.
    pub fn clear_grid(&mut self) -> SessionResult<()> {
        self.ensure_in_progress()?;
        for (index, _) in self.grid.occupied() {
            self.events.push(SessionEvent::CellChanged { index, item: None });
        }
        self.grid.clear();
        Ok(())
    }

    /// The first recipe, in catalog order, the current grid would craft.
    #[must_use]
    pub fn preview_recipe(&self) -> Option<&Recipe> {
        self.catalog.find_first_match(&self.grid)
    }

    /// The item the current grid would craft, if any.
    #[must_use]
    pub fn preview_output(&self) -> Option<&ItemId> {
        self.preview_recipe().map(Recipe::result_item)
    }

    /// Craft whatever the grid currently makes.
    ///
    /// An empty preview is a no-op that uses no attempt. Otherwise the
    /// attempt counter increases by exactly one; the puzzle is solved when
    /// the grid satisfies the target recipe.
    pub fn attempt_craft(&mut self) -> SessionResult<CraftOutcome> {
        self.ensure_in_progress()?;

        let Some(recipe) = self.preview_recipe() else {
            debug!("Craft ignored: grid matches no recipe");
            return Ok(CraftOutcome::NoMatch);
        };
        let recipe_id = recipe.id;
        let crafted = recipe.result.item.clone();

        let correct = match self.catalog.matcher().matches(&self.target, &self.grid) {
            Ok(matched) => matched,
            Err(e) => {
                warn!("Target {} cannot be evaluated: {}", self.target.id, e);
                false
            },
        };

        self.attempts += 1;
        let record = AttemptRecord {
            attempt: self.attempts,
            recipe: recipe_id,
            crafted: crafted.clone(),
            correct,
        };
        self.history.push(record.clone());
        self.events.push(SessionEvent::AttemptRecorded(record));
        debug!(
            "Attempt {}/{} crafted {}",
            self.attempts, self.max_attempts, crafted
        );

        if correct {
            self.transition_to(SessionState::Solved);
            info!("Puzzle solved in {} attempts", self.attempts);
            Ok(CraftOutcome::Solved {
                attempts: self.attempts,
            })
        } else if self.attempts >= self.max_attempts {
            self.transition_to(SessionState::Exhausted);
            info!("Puzzle failed after {} attempts", self.attempts);
            Ok(CraftOutcome::Exhausted {
                attempts: self.attempts,
            })
        } else {
            Ok(CraftOutcome::Continue {
                attempt: self.attempts,
                crafted,
            })
        }
    }

    fn ensure_in_progress(&self) -> SessionResult<()> {
        if self.state.is_terminal() {
            Err(SessionError::InvalidState(self.state))
        } else {
            Ok(())
        }
    }

    fn transition_to(&mut self, new_state: SessionState) {
        let old_state = self.state;
        self.state = new_state;
        self.events.push(SessionEvent::StateChanged {
            from: old_state,
            to: new_state,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftle_kernel::catalog::ItemCatalog;
    use craftle_kernel::recipe::{IngredientSpec, ShapedPattern};
    use craftle_kernel::tags::TagCatalog;

    const TORCH: u32 = 0;
    const PLANKS: u32 = 1;
    const STICK: u32 = 2;
    const SHADOW: u32 = 3;

    fn item(id: &str) -> ItemId {
        ItemId::new(id)
    }

    /// torch (1×1 stick), planks (log), stick (two planks, vertical),
    /// and a later recipe shadowed by planks.
    fn catalog() -> Arc<Catalog> {
        let tags = TagCatalog::new().with_tag("logs", ["oak_log", "birch_log"]);
        let recipes = vec![
            Recipe::shaped(
                RecipeId::new(0),
                ShapedPattern::new(&["X"]).with_key('X', IngredientSpec::item("stick")),
                "torch",
            ),
            Recipe::shapeless(RecipeId::new(0), vec![IngredientSpec::tag("logs")], "planks"),
            Recipe::shaped(
                RecipeId::new(0),
                ShapedPattern::new(&["#", "#"]).with_key('#', IngredientSpec::item("planks")),
                "stick",
            ),
            Recipe::shapeless(RecipeId::new(0), vec![IngredientSpec::item("oak_log")], "oak_wood"),
        ];
        Arc::new(Catalog::new(recipes, tags, ItemCatalog::new()))
    }

    fn session(target: u32) -> PuzzleSession {
        PuzzleSession::new(catalog(), RecipeId::new(target)).expect("session")
    }

    #[test]
    fn test_initial_state() {
        let session = session(TORCH);
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.attempts(), 0);
        assert_eq!(session.attempts_remaining(), MAX_ATTEMPTS);
        assert!(session.grid().is_empty());
        assert_eq!(session.target().result_item(), &item("torch"));
        assert!(session.preview_output().is_none());
    }

    #[test]
    fn test_unknown_target_rejected() {
        let err = PuzzleSession::new(catalog(), RecipeId::new(99)).expect_err("no recipe 99");
        assert_eq!(
            err,
            SessionError::Catalog(CatalogError::UnknownRecipe(RecipeId::new(99)))
        );
    }

    #[test]
    fn test_preview_updates_with_grid() {
        let mut session = session(TORCH);
        session.set_cell(0, Some(item("oak_log"))).expect("set");
        assert_eq!(session.preview_output(), Some(&item("planks")));

        session.set_cell(0, None).expect("clear");
        assert!(session.preview_output().is_none());

        session.set_cell(4, Some(item("stick"))).expect("set");
        assert_eq!(session.preview_output(), Some(&item("torch")));
    }

    #[test]
    fn test_invalid_cell() {
        let mut session = session(TORCH);
        assert_eq!(
            session.set_cell(9, Some(item("stick"))),
            Err(SessionError::InvalidCell(9))
        );
    }

    #[test]
    fn test_no_match_does_not_consume_attempt() {
        let mut session = session(TORCH);
        assert_eq!(session.attempt_craft(), Ok(CraftOutcome::NoMatch));

        session.set_cell(0, Some(item("cobblestone"))).expect("set");
        assert_eq!(session.attempt_craft(), Ok(CraftOutcome::NoMatch));
        assert_eq!(session.attempts(), 0);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_wrong_recipe_consumes_attempt() {
        let mut session = session(TORCH);
        session.set_cell(0, Some(item("birch_log"))).expect("set");

        let outcome = session.attempt_craft().expect("attempt");
        assert_eq!(
            outcome,
            CraftOutcome::Continue {
                attempt: 1,
                crafted: item("planks"),
            }
        );
        assert_eq!(session.attempts(), 1);
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].recipe, RecipeId::new(PLANKS));
        assert!(!session.history()[0].correct);
    }

    #[test]
    fn test_solved_on_target() {
        let mut session = session(STICK);
        session.set_cell(0, Some(item("oak_log"))).expect("set");
        session.attempt_craft().expect("first");

        session.set_cell(0, None).expect("clear");
        session.set_cell(2, Some(item("planks"))).expect("set");
        session.set_cell(5, Some(item("planks"))).expect("set");
        assert_eq!(session.attempt_craft(), Ok(CraftOutcome::Solved { attempts: 2 }));
        assert_eq!(session.state(), SessionState::Solved);
        assert!(session.is_finished());
        assert!(session.history()[1].correct);
    }

    #[test]
    fn test_solved_session_rejects_moves() {
        let mut session = session(TORCH);
        session.set_cell(8, Some(item("stick"))).expect("set");
        assert_eq!(session.attempt_craft(), Ok(CraftOutcome::Solved { attempts: 1 }));

        assert_eq!(
            session.attempt_craft(),
            Err(SessionError::InvalidState(SessionState::Solved))
        );
        assert_eq!(
            session.set_cell(0, None),
            Err(SessionError::InvalidState(SessionState::Solved))
        );
        assert_eq!(
            session.clear_grid(),
            Err(SessionError::InvalidState(SessionState::Solved))
        );
        assert_eq!(session.attempts(), 1);
    }

    #[test]
    fn test_target_shadowed_by_earlier_recipe_still_wins() {
        // oak_log previews as planks (earlier in the catalog) but also
        // satisfies the oak_wood target.
        let mut session = session(SHADOW);
        session.set_cell(3, Some(item("oak_log"))).expect("set");
        assert_eq!(session.preview_output(), Some(&item("planks")));
        assert_eq!(session.attempt_craft(), Ok(CraftOutcome::Solved { attempts: 1 }));
    }

    #[test]
    fn test_exhausted_after_max_attempts() {
        let mut session = session(TORCH);
        session.set_cell(0, Some(item("oak_log"))).expect("set");

        for attempt in 1..MAX_ATTEMPTS {
            assert_eq!(
                session.attempt_craft(),
                Ok(CraftOutcome::Continue {
                    attempt,
                    crafted: item("planks"),
                })
            );
            assert_eq!(session.attempts(), attempt);
        }

        assert_eq!(
            session.attempt_craft(),
            Ok(CraftOutcome::Exhausted {
                attempts: MAX_ATTEMPTS
            })
        );
        assert_eq!(session.state(), SessionState::Exhausted);
        assert_eq!(session.attempts_remaining(), 0);
        assert_eq!(
            session.attempt_craft(),
            Err(SessionError::InvalidState(SessionState::Exhausted))
        );
        assert_eq!(session.attempts(), MAX_ATTEMPTS);
        assert_eq!(
            session.set_cell(1, Some(item("stick"))),
            Err(SessionError::InvalidState(SessionState::Exhausted))
        );
        assert_eq!(
            session.clear_grid(),
            Err(SessionError::InvalidState(SessionState::Exhausted))
        );
        assert_eq!(session.grid().get(0), Some(&item("oak_log")));
    }

    #[test]
    fn test_win_on_last_attempt_is_solved() {
        let mut session = session(TORCH).with_max_attempts(2);
        session.set_cell(0, Some(item("oak_log"))).expect("set");
        session.attempt_craft().expect("first");

        session.set_cell(0, Some(item("stick"))).expect("swap");
        assert_eq!(session.attempt_craft(), Ok(CraftOutcome::Solved { attempts: 2 }));
    }

    #[test]
    fn test_events_report_transitions() {
        let mut session = session(TORCH);
        session.set_cell(4, Some(item("stick"))).expect("set");
        session.attempt_craft().expect("win");

        let events = session.take_events();
        assert_eq!(
            events.first(),
            Some(&SessionEvent::CellChanged {
                index: 4,
                item: Some(item("stick")),
            })
        );
        assert_eq!(
            events.last(),
            Some(&SessionEvent::StateChanged {
                from: SessionState::InProgress,
                to: SessionState::Solved,
            })
        );
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn test_clear_grid() {
        let mut session = session(TORCH);
        session.set_cell(1, Some(item("stick"))).expect("set");
        session.set_cell(2, Some(item("stick"))).expect("set");
        session.take_events();

        session.clear_grid().expect("clear");
        assert!(session.grid().is_empty());
        assert_eq!(session.take_events().len(), 2);
    }

    #[test]
    fn test_daily_start_is_deterministic() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).expect("date");
        let a = PuzzleSession::daily(catalog(), day).expect("daily");
        let b = PuzzleSession::daily(catalog(), day).expect("daily");
        assert_eq!(a.target().id, b.target().id);
    }

    #[test]
    fn test_empty_catalog_cannot_start() {
        let empty = Arc::new(Catalog::default());
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).expect("date");
        assert_eq!(
            PuzzleSession::random(empty, day).map(|s| s.target().id),
            Err(SessionError::EmptyCatalog)
        );
    }
}
