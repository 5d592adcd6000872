//! Herb refining and pill consumption.
use crate::config::AlchemyCfg;
use crate::outcome::ActionOutcome;
use crate::state::PlayerState;

pub fn refine_pill(state: &mut PlayerState, cfg: &AlchemyCfg) -> ActionOutcome {
    if state.herbs < cfg.herbs_per_pill {
        return ActionOutcome::rejected(format!(
            "Need {:.0} spirit herbs to refine a pill (have {:.1})",
            cfg.herbs_per_pill, state.herbs
        ));
    }
    state.herbs -= cfg.herbs_per_pill;
    state.pills = state.pills.saturating_add(1);
    ActionOutcome::success(format!("Refined a pill! ({} in stock)", state.pills))
}

pub fn consume_pill(state: &mut PlayerState, cfg: &AlchemyCfg) -> ActionOutcome {
    if state.pills == 0 {
        return ActionOutcome::rejected("You have no pills");
    }
    state.pills -= 1;
    state.body += cfg.body_per_pill;
    ActionOutcome::success(format!(
        "The pill tempers your body. Body is now {:.1}",
        state.body
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refining_consumes_three_herbs() {
        let mut state = PlayerState {
            herbs: 3.5,
            ..PlayerState::default()
        };
        let cfg = AlchemyCfg::default();
        assert!(refine_pill(&mut state, &cfg).ok);
        assert_eq!(state.pills, 1);
        assert!((state.herbs - 0.5).abs() <= f64::EPSILON);
        let before = state.clone();
        assert!(!refine_pill(&mut state, &cfg).ok);
        assert_eq!(state, before);
    }

    #[test]
    fn pills_grow_body() {
        let mut state = PlayerState {
            pills: 1,
            ..PlayerState::default()
        };
        let cfg = AlchemyCfg::default();
        assert!(consume_pill(&mut state, &cfg).ok);
        assert!((state.body - 1.5).abs() <= f64::EPSILON);
        assert!(!consume_pill(&mut state, &cfg).ok);
        assert_eq!(state.pills, 0);
    }
}
