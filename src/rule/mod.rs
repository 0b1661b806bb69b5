//! Transition rule engine: truth table and prime-implicant cover
//!
//! The rule is represented two ways, both precomputed once and then
//! immutable:
//!
//! - A truth table over 10-bit contexts, where bits 0..=8 are the 3x3
//!   neighborhood at time t in row-major order (bit 4 is the center) and
//!   bit 9 is the asserted successor state at time t+1. An entry is true
//!   iff the rule maps that neighborhood to that successor.
//! - A prime-implicant cover of the rule's *negation*: a minimal list of
//!   (care, forbidden) mask pairs such that a context is invalid exactly
//!   when its bits at the `care` positions equal `forbidden`. Negating one
//!   pair gives a CNF clause asserting that at least one care position
//!   deviates from its forbidden value.

use std::sync::OnceLock;

/// Number of bits in a transition context (9 neighborhood + 1 successor).
pub const CONTEXT_BITS: usize = 10;

/// Bit index of the successor state within a context.
pub const SUCCESSOR_BIT: usize = 9;

/// Neighborhood mask excluding the center cell (bit 4).
const OUTER_MASK: u16 = 0b1_1110_1111;

/// One term of the negated rule's prime-implicant cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimeImplicant {
    /// Which context positions are constrained.
    pub care: u16,
    /// Required bit values at the care positions for the context to be
    /// invalid.
    pub forbidden: u16,
}

impl PrimeImplicant {
    /// True when the pair covers (invalidates) the given context.
    pub fn covers(&self, context: u16) -> bool {
        context & self.care == self.forbidden
    }
}

/// A two-state outer-totalistic rule with 3x3 Moore neighborhood,
/// precomputed as a truth table plus the prime-implicant cover of its
/// negation.
pub struct TransitionRule {
    table: [bool; 1 << CONTEXT_BITS],
    implicants: Vec<PrimeImplicant>,
}

impl TransitionRule {
    /// Construct the rule from its birth and survival neighbor counts
    /// (e.g. B3/S23 for Conway's Life).
    pub fn from_birth_survival(birth: &[u32], survival: &[u32]) -> Self {
        let mut table = [false; 1 << CONTEXT_BITS];
        for neighborhood in 0u16..(1u16 << SUCCESSOR_BIT) {
            let count = (neighborhood & OUTER_MASK).count_ones();
            let center_alive = neighborhood >> 4 & 1 == 1;
            let next_alive = if center_alive {
                survival.contains(&count)
            } else {
                birth.contains(&count)
            };
            let context = neighborhood | (u16::from(next_alive) << SUCCESSOR_BIT);
            table[context as usize] = true;
        }

        let implicants = compute_prime_implicants(&table);
        Self { table, implicants }
    }

    /// Whether the rule accepts the 10-bit context (neighborhood plus
    /// asserted successor).
    pub fn accepts(&self, context: u16) -> bool {
        self.table[context as usize]
    }

    /// The successor state produced by a 9-bit neighborhood.
    pub fn successor(&self, neighborhood: u16) -> bool {
        self.table[(neighborhood | 1 << SUCCESSOR_BIT) as usize]
    }

    /// The prime-implicant cover of the negated rule.
    pub fn implicants(&self) -> &[PrimeImplicant] {
        &self.implicants
    }
}

/// The Conway Life rule (B3/S23), built once per process.
pub fn conway() -> &'static TransitionRule {
    static CONWAY: OnceLock<TransitionRule> = OnceLock::new();
    CONWAY.get_or_init(|| TransitionRule::from_birth_survival(&[3], &[2, 3]))
}

/// Compute a minimal prime-implicant cover of the table's complement.
///
/// Scans care masks in ascending order; since every proper submask of a
/// mask is numerically smaller, all potential subsumers of a candidate have
/// already been accepted by the time it is examined, so a single forward
/// subsumption check keeps the cover minimal.
fn compute_prime_implicants(table: &[bool; 1 << CONTEXT_BITS]) -> Vec<PrimeImplicant> {
    let full: u16 = (1 << CONTEXT_BITS) - 1;
    let mut cover: Vec<PrimeImplicant> = Vec::new();
    for care in 1..=full {
        let free = !care & full;
        // Enumerate candidate forbidden patterns (submasks of care) in
        // ascending order.
        let mut forbidden: u16 = 0;
        loop {
            if all_covered_invalid(table, forbidden, free)
                && !cover
                    .iter()
                    .any(|p| p.care & care == p.care && forbidden & p.care == p.forbidden)
            {
                cover.push(PrimeImplicant { care, forbidden });
            }
            if forbidden == care {
                break;
            }
            forbidden = forbidden.wrapping_sub(care) & care;
        }
    }
    cover
}

/// True when every context whose care bits equal `forbidden` is rejected by
/// the rule. `free` is the complement of the care mask.
fn all_covered_invalid(table: &[bool; 1 << CONTEXT_BITS], forbidden: u16, free: u16) -> bool {
    let mut spread: u16 = 0;
    loop {
        if table[(forbidden | spread) as usize] {
            return false;
        }
        if spread == free {
            return true;
        }
        spread = spread.wrapping_sub(free) & free;
    }
}
