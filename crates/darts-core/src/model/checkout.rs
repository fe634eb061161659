use crate::model::dart::Dart;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub const MAX_CHECKOUT: u16 = 170;
pub const MAX_TURN_SCORE: u16 = 180;

/// Doubles in the order players usually prefer to finish on.
const FINISH_PREFERENCE: [u8; 10] = [20, 16, 18, 12, 10, 8, 14, 6, 4, 2];

/// How many darts a score needs, at minimum, to be checked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckoutType {
    OneDart,
    TwoDart,
    ThreeDart,
    NoCheckout,
}

impl CheckoutType {
    pub const fn min_darts(self) -> Option<u8> {
        match self {
            CheckoutType::OneDart => Some(1),
            CheckoutType::TwoDart => Some(2),
            CheckoutType::ThreeDart => Some(3),
            CheckoutType::NoCheckout => None,
        }
    }

    pub const fn is_finishable(self) -> bool {
        !matches!(self, CheckoutType::NoCheckout)
    }
}

/// User-supplied answer to "how many darts did that take?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DartResolution {
    pub darts_used: u8,
    pub darts_at_double: u8,
}

impl DartResolution {
    pub const FULL_VISIT: DartResolution = DartResolution {
        darts_used: 3,
        darts_at_double: 0,
    };

    pub const fn new(darts_used: u8, darts_at_double: u8) -> Self {
        Self {
            darts_used,
            darts_at_double,
        }
    }
}

/// The set of resolutions that are consistent with a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutOptions {
    resolutions: Vec<DartResolution>,
}

impl CheckoutOptions {
    /// Options for a turn that started on `start` and left `remaining`.
    pub fn for_turn(start: u16, remaining: u16) -> Self {
        let min_darts = checkout_type(start).min_darts();
        let mut resolutions = Vec::new();

        match (remaining, min_darts) {
            (0, Some(min)) => {
                for used in min..=3 {
                    for at_double in 1..=(used - min + 1) {
                        resolutions.push(DartResolution::new(used, at_double));
                    }
                }
            }
            (0, None) => {}
            (_, Some(min)) => {
                for at_double in 0..=(3 - min + 1) {
                    resolutions.push(DartResolution::new(3, at_double));
                }
            }
            (_, None) => resolutions.push(DartResolution::FULL_VISIT),
        }

        Self { resolutions }
    }

    pub fn resolutions(&self) -> &[DartResolution] {
        &self.resolutions
    }

    pub fn allows(&self, resolution: DartResolution) -> bool {
        self.resolutions.contains(&resolution)
    }

    pub fn is_ambiguous(&self) -> bool {
        self.resolutions.len() > 1
    }

    /// The resolution to apply without asking, when there is only one.
    pub fn only(&self) -> Option<DartResolution> {
        match self.resolutions.as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }

    pub fn darts_used_choices(&self) -> Vec<u8> {
        let mut choices: Vec<u8> = self.resolutions.iter().map(|r| r.darts_used).collect();
        choices.dedup();
        choices
    }
}

struct CheckoutTables {
    routes: Vec<Option<Vec<Dart>>>,
    reachable_turns: [bool; MAX_TURN_SCORE as usize + 1],
}

static TABLES: Lazy<CheckoutTables> = Lazy::new(CheckoutTables::build);

impl CheckoutTables {
    fn build() -> Self {
        let finishes = finishing_darts();
        let setups = setup_darts();

        let mut setup_for_value: [Option<Dart>; 61] = [None; 61];
        for dart in setups.iter().rev() {
            setup_for_value[dart.value() as usize] = Some(*dart);
        }

        let mut routes = vec![None; MAX_CHECKOUT as usize + 1];
        for (score, slot) in routes.iter_mut().enumerate() {
            let score = score as u16;
            *slot = one_dart_route(score, &finishes)
                .or_else(|| two_dart_route(score, &finishes, &setup_for_value))
                .or_else(|| three_dart_route(score, &finishes, &setups, &setup_for_value));
        }

        let values: Vec<u16> = {
            let mut values: Vec<u16> = Dart::all().map(Dart::value).collect();
            values.sort_unstable();
            values.dedup();
            values
        };
        let mut reachable_turns = [false; MAX_TURN_SCORE as usize + 1];
        for a in &values {
            for b in &values {
                for c in &values {
                    let total = (a + b + c) as usize;
                    if total <= MAX_TURN_SCORE as usize {
                        reachable_turns[total] = true;
                    }
                }
            }
        }

        Self {
            routes,
            reachable_turns,
        }
    }
}

fn finishing_darts() -> Vec<Dart> {
    let mut darts: Vec<Dart> = FINISH_PREFERENCE.iter().map(|&n| Dart::Double(n)).collect();
    for n in Dart::BOARD_NUMBERS.rev() {
        if !FINISH_PREFERENCE.contains(&n) {
            darts.push(Dart::Double(n));
        }
    }
    darts.push(Dart::InnerBull);
    darts
}

fn setup_darts() -> Vec<Dart> {
    let mut darts: Vec<Dart> = Dart::BOARD_NUMBERS.rev().map(Dart::Treble).collect();
    darts.extend(Dart::BOARD_NUMBERS.rev().map(Dart::Single));
    darts.push(Dart::OuterBull);
    darts.push(Dart::InnerBull);
    darts.extend(Dart::BOARD_NUMBERS.rev().map(Dart::Double));
    darts
}

fn one_dart_route(score: u16, finishes: &[Dart]) -> Option<Vec<Dart>> {
    finishes
        .iter()
        .find(|finish| finish.value() == score)
        .map(|finish| vec![*finish])
}

fn two_dart_route(
    score: u16,
    finishes: &[Dart],
    setup_for_value: &[Option<Dart>; 61],
) -> Option<Vec<Dart>> {
    finishes.iter().find_map(|finish| {
        let rest = score.checked_sub(finish.value())?;
        let setup = (*setup_for_value.get(rest as usize)?)?;
        Some(vec![setup, *finish])
    })
}

fn three_dart_route(
    score: u16,
    finishes: &[Dart],
    setups: &[Dart],
    setup_for_value: &[Option<Dart>; 61],
) -> Option<Vec<Dart>> {
    finishes.iter().find_map(|finish| {
        let before_finish = score.checked_sub(finish.value())?;
        setups.iter().find_map(|first| {
            let rest = before_finish.checked_sub(first.value())?;
            let second = (*setup_for_value.get(rest as usize)?)?;
            Some(vec![*first, second, *finish])
        })
    })
}

/// Classify a score by the fewest darts that can check it out.
pub fn checkout_type(score: u16) -> CheckoutType {
    let darts = TABLES
        .routes
        .get(score as usize)
        .and_then(|route| route.as_ref())
        .map(Vec::len);
    match darts {
        Some(1) => CheckoutType::OneDart,
        Some(2) => CheckoutType::TwoDart,
        Some(3) => CheckoutType::ThreeDart,
        _ => CheckoutType::NoCheckout,
    }
}

/// A suggested route for checking out `score`, if one exists.
pub fn checkout_route(score: u16) -> Option<&'static [Dart]> {
    TABLES
        .routes
        .get(score as usize)
        .and_then(|route| route.as_deref())
}

/// Whether three darts can total `score`.
pub fn is_possible_turn(score: u16) -> bool {
    TABLES
        .reachable_turns
        .get(score as usize)
        .copied()
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_dart_checkouts_are_doubles_and_bull() {
        assert_eq!(checkout_type(40), CheckoutType::OneDart);
        assert_eq!(checkout_type(2), CheckoutType::OneDart);
        assert_eq!(checkout_type(50), CheckoutType::OneDart);
        assert_eq!(checkout_type(41), CheckoutType::TwoDart);
        assert_eq!(checkout_type(1), CheckoutType::NoCheckout);
        assert_eq!(checkout_type(0), CheckoutType::NoCheckout);
    }

    #[test]
    fn two_dart_window_has_known_gaps() {
        assert_eq!(checkout_type(95), CheckoutType::TwoDart);
        assert_eq!(checkout_type(110), CheckoutType::TwoDart);
        for gap in [99, 102, 103, 105, 106, 108, 109] {
            assert_eq!(checkout_type(gap), CheckoutType::ThreeDart, "{gap}");
        }
    }

    #[test]
    fn bogey_numbers_have_no_checkout() {
        for bogey in [159, 162, 163, 165, 166, 168, 169] {
            assert_eq!(checkout_type(bogey), CheckoutType::NoCheckout, "{bogey}");
        }
        assert_eq!(checkout_type(170), CheckoutType::ThreeDart);
        assert_eq!(checkout_type(171), CheckoutType::NoCheckout);
        assert_eq!(checkout_type(501), CheckoutType::NoCheckout);
    }

    #[test]
    fn routes_add_up_and_finish_on_a_double() {
        for score in 2..=MAX_CHECKOUT {
            if let Some(route) = checkout_route(score) {
                let total: u16 = route.iter().map(|d| d.value()).sum();
                assert_eq!(total, score);
                assert!(route.last().unwrap().is_double());
            }
        }
    }

    #[test]
    fn preferred_routes() {
        assert_eq!(
            checkout_route(170).unwrap(),
            &[Dart::Treble(20), Dart::Treble(20), Dart::InnerBull]
        );
        assert_eq!(checkout_route(100).unwrap(), &[Dart::Treble(20), Dart::Double(20)]);
        assert_eq!(checkout_route(32).unwrap(), &[Dart::Double(16)]);
    }

    #[test]
    fn impossible_turn_totals() {
        for score in [163, 166, 169, 172, 173, 175, 176, 178, 179] {
            assert!(!is_possible_turn(score), "{score}");
        }
        for score in [0, 1, 60, 140, 171, 174, 177, 180] {
            assert!(is_possible_turn(score), "{score}");
        }
        assert!(!is_possible_turn(181));
    }

    #[test]
    fn finished_options_span_darts_used() {
        let options = CheckoutOptions::for_turn(95, 0);
        assert_eq!(options.darts_used_choices(), vec![2, 3]);
        assert!(options.allows(DartResolution::new(2, 1)));
        assert!(options.allows(DartResolution::new(3, 2)));
        assert!(!options.allows(DartResolution::new(1, 1)));
        assert!(!options.allows(DartResolution::new(3, 3)));
    }

    #[test]
    fn one_dart_finish_allows_three_at_double() {
        let options = CheckoutOptions::for_turn(40, 0);
        assert!(options.allows(DartResolution::new(1, 1)));
        assert!(options.allows(DartResolution::new(3, 3)));
        assert_eq!(options.resolutions().len(), 6);
    }

    #[test]
    fn missed_finish_offers_darts_at_double() {
        let options = CheckoutOptions::for_turn(40, 20);
        assert_eq!(options.darts_used_choices(), vec![3]);
        assert!(options.allows(DartResolution::new(3, 0)));
        assert!(options.allows(DartResolution::new(3, 3)));
        assert!(options.is_ambiguous());
    }

    #[test]
    fn unfinishable_start_has_single_option() {
        let options = CheckoutOptions::for_turn(200, 40);
        assert_eq!(options.only(), Some(DartResolution::FULL_VISIT));
        assert!(!options.is_ambiguous());
    }

    #[test]
    fn three_dart_finish_is_unambiguous() {
        let options = CheckoutOptions::for_turn(170, 0);
        assert_eq!(options.only(), Some(DartResolution::new(3, 1)));
    }
}
