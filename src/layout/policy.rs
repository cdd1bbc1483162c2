//! Page-break policy shared by every block emitter.
//!
//! Exact text heights are not known before a block is drawn, so the policy
//! combines two signals: a conservative per-kind space estimate and the
//! fraction of the page the cursor has already covered.  Headings reserve room
//! for content that has not been emitted yet, and level-2 headings reserve the
//! most because they usually open a level-3 subsection.  Only level 1 waits for
//! a tight page before the position signal applies.

use crate::layout::state::LayoutState;
use crate::model::BlockKind;

/// Thresholds for one heading level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadingRule {
    /// Space (mm) the heading plus its anticipated content needs.
    pub min_space: f64,
    /// Cursor fraction past which the heading moves to a new page.
    pub position_fraction: f64,
    /// When set, the position signal only applies while less than
    /// `min_space * tight_factor` remains.
    pub tight_factor: Option<f64>,
}

impl HeadingRule {
    /// Rule that breaks past `position_fraction` however much space is left.
    pub const fn new(min_space: f64, position_fraction: f64) -> Self {
        Self {
            min_space,
            position_fraction,
            tight_factor: None,
        }
    }

    /// Restricts the position signal to tight pages.
    pub const fn with_tight_factor(self, tight_factor: f64) -> Self {
        Self {
            tight_factor: Some(tight_factor),
            ..self
        }
    }

    fn is_tight(&self, remaining: f64) -> bool {
        self.tight_factor
            .map_or(true, |factor| remaining < self.min_space * factor)
    }
}

/// Thresholds for body content that may follow a heading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContentRule {
    /// Estimated space (mm) for the first lines of the block.
    pub min_space: f64,
    /// Extra space required when the block directly follows a heading.
    pub after_heading_buffer: f64,
    /// Cursor fraction past which content following a heading moves on.
    pub after_heading_fraction: f64,
}

impl ContentRule {
    pub const fn new(min_space: f64, after_heading_buffer: f64, after_heading_fraction: f64) -> Self {
        Self {
            min_space,
            after_heading_buffer,
            after_heading_fraction,
        }
    }
}

/// Parent/child affinity between a level-2 heading and a level-3 heading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffinityRule {
    /// Fraction past which a level-2 heading counts as low on the page.
    pub parent_fraction: f64,
    /// Multiplier on the level-3 `min_space` applied while the parent is low.
    pub space_factor: f64,
}

/// Why the policy asked for a new page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakReason {
    /// The estimated space for the block is not available.
    SpaceShortfall,
    /// The cursor is already far down the page.
    PositionFraction,
    /// A level-3 heading would leave its low level-2 parent behind.
    HeadingAffinity,
    /// Content directly after a heading would start too far down the page.
    FollowsHeading,
}

/// Outcome of a policy query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Break(BreakReason),
}

impl Decision {
    pub fn is_break(self) -> bool {
        matches!(self, Self::Break(_))
    }
}

/// Named, tunable thresholds of the page-break policy.
///
/// The exact numbers are not load-bearing; what matters are their
/// relationships: level 2 needs the most headroom and breaks at the smallest
/// position fraction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BreakPolicy {
    /// Distance (mm) below the top margin in which nothing ever breaks.
    pub fresh_zone: f64,
    pub h1: HeadingRule,
    pub h2: HeadingRule,
    pub h3: HeadingRule,
    /// Levels 4 and deeper.
    pub minor_heading: HeadingRule,
    pub affinity: AffinityRule,
    pub paragraph: ContentRule,
    pub list_item: ContentRule,
    /// Estimated space (mm) for the first lines of a code block.
    pub code: f64,
    pub inline_code: f64,
}

impl Default for BreakPolicy {
    fn default() -> Self {
        Self {
            fresh_zone: 40.0,
            h1: HeadingRule::new(80.0, 0.60).with_tight_factor(1.2),
            h2: HeadingRule::new(100.0, 0.40),
            h3: HeadingRule::new(65.0, 0.55),
            minor_heading: HeadingRule::new(45.0, 0.60),
            affinity: AffinityRule {
                parent_fraction: 0.35,
                space_factor: 2.0,
            },
            paragraph: ContentRule::new(24.0, 20.0, 0.65),
            list_item: ContentRule::new(10.0, 0.0, 0.70),
            code: 20.0,
            inline_code: 10.0,
        }
    }
}

impl BreakPolicy {
    /// Returns whether `kind` should start on a new page.
    pub fn should_break(
        &self,
        state: &LayoutState,
        kind: BlockKind,
        remaining: f64,
        page_height: f64,
    ) -> bool {
        self.decide(state, kind, remaining, page_height).is_break()
    }

    /// Decides whether `kind` fits at the cursor or moves to a new page.
    pub fn decide(
        &self,
        state: &LayoutState,
        kind: BlockKind,
        remaining: f64,
        page_height: f64,
    ) -> Decision {
        if self.in_fresh_zone(state) {
            return Decision::Continue;
        }

        let fraction = state.position_fraction(page_height);
        match kind {
            BlockKind::Heading(3) => self.decide_subsection(state, remaining, page_height),
            BlockKind::Heading(level) => {
                Self::decide_heading(self.heading_rule(level), fraction, remaining)
            }
            BlockKind::Paragraph => Self::decide_content(&self.paragraph, state, fraction, remaining),
            BlockKind::ListItem => Self::decide_content(&self.list_item, state, fraction, remaining),
            BlockKind::Code | BlockKind::HighlightedCode => Self::decide_space(self.code, remaining),
            BlockKind::InlineCode => Self::decide_space(self.inline_code, remaining),
            BlockKind::ThematicBreak => Decision::Continue,
        }
    }

    /// Returns whether the cursor is still close to the top margin.
    pub fn in_fresh_zone(&self, state: &LayoutState) -> bool {
        state.cursor() <= state.top() + self.fresh_zone
    }

    /// Rule applied to headings of `level`.
    pub fn heading_rule(&self, level: u8) -> &HeadingRule {
        match level {
            0 | 1 => &self.h1,
            2 => &self.h2,
            3 => &self.h3,
            _ => &self.minor_heading,
        }
    }

    fn decide_heading(rule: &HeadingRule, fraction: f64, remaining: f64) -> Decision {
        if remaining < rule.min_space {
            Decision::Break(BreakReason::SpaceShortfall)
        } else if fraction > rule.position_fraction && rule.is_tight(remaining) {
            Decision::Break(BreakReason::PositionFraction)
        } else {
            Decision::Continue
        }
    }

    fn decide_subsection(&self, state: &LayoutState, remaining: f64, page_height: f64) -> Decision {
        let own = Self::decide_heading(&self.h3, state.position_fraction(page_height), remaining);
        if own.is_break() {
            return own;
        }

        let parent_is_low = state
            .level2_on_current_page()
            .map_or(false, |parent| {
                parent.y / page_height > self.affinity.parent_fraction
            });
        if parent_is_low && remaining < self.h3.min_space * self.affinity.space_factor {
            Decision::Break(BreakReason::HeadingAffinity)
        } else {
            Decision::Continue
        }
    }

    fn decide_content(
        rule: &ContentRule,
        state: &LayoutState,
        fraction: f64,
        remaining: f64,
    ) -> Decision {
        if state.follows_heading() {
            if fraction > rule.after_heading_fraction {
                return Decision::Break(BreakReason::FollowsHeading);
            }
            return Self::decide_space(rule.min_space + rule.after_heading_buffer, remaining);
        }
        Self::decide_space(rule.min_space, remaining)
    }

    fn decide_space(needed: f64, remaining: f64) -> Decision {
        if remaining < needed {
            Decision::Break(BreakReason::SpaceShortfall)
        } else {
            Decision::Continue
        }
    }
}
