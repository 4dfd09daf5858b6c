use crate::error::RaceError;

const WINNER_POINTS: u32 = 40;
const LED_LAP_BONUS: u32 = 5;
const MOST_LAPS_LED_BONUS: u32 = 5;

/// points_for_finish returns the championship points of a finishing position. The winner scores
/// 40, second place 35 and every further position one point less, down to a single point. Leading
/// at least one lap and leading the most laps score 5 bonus points each.
pub fn points_for_finish(
    position: u32,
    led_laps: bool,
    led_most_laps: bool,
) -> Result<u32, RaceError> {
    let base = match position {
        0 => return Err(RaceError::InvalidFinishPosition(position)),
        1 => WINNER_POINTS,
        p => 37u32.saturating_sub(p).max(1),
    };

    let mut points = base;
    if led_laps {
        points += LED_LAP_BONUS;
    }
    if led_most_laps {
        points += MOST_LAPS_LED_BONUS;
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finishing_points() {
        assert_eq!(points_for_finish(1, false, false), Ok(40));
        assert_eq!(points_for_finish(2, false, false), Ok(35));
        assert_eq!(points_for_finish(10, false, false), Ok(27));
        assert_eq!(points_for_finish(36, false, false), Ok(1));
        assert_eq!(points_for_finish(43, false, false), Ok(1));
    }

    #[test]
    fn bonus_points() {
        assert_eq!(points_for_finish(1, true, true), Ok(50));
        assert_eq!(points_for_finish(5, true, false), Ok(37));
    }

    #[test]
    fn position_zero_is_rejected() {
        assert_eq!(
            points_for_finish(0, true, false),
            Err(RaceError::InvalidFinishPosition(0))
        );
    }
}
