use std::cmp::min;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ActionSpace, DiscreteEnv, EnvError, Transition};

const N_STATES: usize = 500;
const N_ACTIONS: usize = 6;

/// The classic 5x5 taxi grid: pick a passenger up at one of four stands and
/// drop them off at their destination.
///
/// Every (state, action) pair has exactly one outcome, so the transition
/// model doubles as the step function.
#[derive(Debug, Clone)]
pub struct TaxiEnv {
    ready: bool,
    render_mode: bool,
    initial_states: Vec<usize>,
    model: Vec<[[Transition; 1]; N_ACTIONS]>,
    curr_obs: usize,
    rng: StdRng,
}

impl TaxiEnv {
    const MAP: [&'static str; 7] = [
        "+---------+",
        "|R: | : :G|",
        "| : | : : |",
        "| : : : : |",
        "| | : | : |",
        "|Y| : |B: |",
        "+---------+",
    ];
    pub const LOCS: [(usize, usize); 4] = [(0, 0), (0, 4), (4, 0), (4, 3)];
    pub const ACTIONS: [&'static str; N_ACTIONS] = [
        "move(↓)",
        "move(↑)",
        "move(->)",
        "move(<-)",
        "PickUp()",
        "DropOff()",
    ];

    pub fn encode(taxi_row: usize, taxi_col: usize, pass_loc: usize, dest_loc: usize) -> usize {
        ((taxi_row * 5 + taxi_col) * 5 + pass_loc) * 4 + dest_loc
    }

    pub fn decode(i: usize) -> (usize, usize, usize, usize) {
        let mut state = i;
        let dest_loc = state % 4;
        state /= 4;
        let pass_loc = state % 5;
        state /= 5;
        let taxi_col = state % 5;
        state /= 5;
        (state, taxi_col, pass_loc, dest_loc)
    }

    fn is_open(row: usize, wall_col: usize) -> bool {
        Self::MAP[1 + row].as_bytes()[wall_col] == b':'
    }

    fn outcome(row: usize, col: usize, pass_loc: usize, dest_loc: usize, action: usize) -> Transition {
        let (mut new_row, mut new_col, mut new_pass_loc) = (row, col, pass_loc);
        let mut reward = -1.0;
        let mut terminated = false;
        let taxi_loc = (row, col);

        match action {
            0 => new_row = min(row + 1, 4),
            1 => new_row = row.saturating_sub(1),
            2 if Self::is_open(row, 2 * col + 2) => new_col = min(col + 1, 4),
            3 if Self::is_open(row, 2 * col) => new_col = col.saturating_sub(1),
            4 => {
                if pass_loc < 4 && taxi_loc == Self::LOCS[pass_loc] {
                    new_pass_loc = 4;
                } else {
                    reward = -10.0;
                }
            }
            5 => {
                if taxi_loc == Self::LOCS[dest_loc] && pass_loc == 4 {
                    new_pass_loc = dest_loc;
                    terminated = true;
                    reward = 20.0;
                } else if Self::LOCS.contains(&taxi_loc) && pass_loc == 4 {
                    new_pass_loc = Self::LOCS
                        .iter()
                        .position(|loc| *loc == taxi_loc)
                        .unwrap_or(pass_loc);
                } else {
                    reward = -10.0;
                }
            }
            _ => {}
        }
        let next_state = Self::encode(new_row, new_col, new_pass_loc, dest_loc);
        Transition::new(1.0, next_state, reward, terminated)
    }

    pub fn new(seed: u64) -> Self {
        let mut initial_states = vec![];
        let mut model = Vec::with_capacity(N_STATES);
        for row in 0..5 {
            for col in 0..5 {
                for pass_loc in 0..5 {
                    for dest_loc in 0..4 {
                        let state = Self::encode(row, col, pass_loc, dest_loc);
                        if pass_loc < 4 && pass_loc != dest_loc {
                            initial_states.push(state);
                        }
                        let outcomes: [[Transition; 1]; N_ACTIONS] = std::array::from_fn(|action| {
                            [Self::outcome(row, col, pass_loc, dest_loc, action)]
                        });
                        model.push(outcomes);
                    }
                }
            }
        }

        Self {
            ready: false,
            render_mode: false,
            initial_states,
            model,
            curr_obs: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DiscreteEnv for TaxiEnv {
    fn reset(&mut self) -> usize {
        let i = self.rng.gen_range(0..self.initial_states.len());
        self.curr_obs = self.initial_states[i];
        self.ready = true;
        self.curr_obs
    }

    fn step(&mut self, action: usize) -> Result<(usize, f64, bool), EnvError> {
        if !self.ready {
            return Err(EnvError::NotReady);
        }
        let outcome = self.transitions(self.curr_obs, action)?[0];
        self.curr_obs = outcome.next_state;
        if outcome.terminated {
            self.ready = false;
        }
        Ok((outcome.next_state, outcome.reward, outcome.terminated))
    }

    fn observation_space(&self) -> usize {
        N_STATES
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::new(N_ACTIONS)
    }

    fn transitions(&self, state: usize, action: usize) -> Result<&[Transition], EnvError> {
        let outcomes = self.model.get(state).ok_or(EnvError::InvalidState {
            state,
            size: N_STATES,
        })?;
        let outcome = outcomes.get(action).ok_or(EnvError::InvalidAction {
            action,
            size: N_ACTIONS,
        })?;
        Ok(&outcome[..])
    }

    fn set_render(&mut self, render: bool) {
        self.render_mode = render;
    }

    fn render(&self) -> String {
        if !self.render_mode {
            return String::new();
        }
        let (row, col, pass_loc, dest_loc) = Self::decode(self.curr_obs);
        let mut lines: Vec<Vec<char>> = Self::MAP.iter().map(|l| l.chars().collect()).collect();
        let (dest_row, dest_col) = Self::LOCS[dest_loc];
        let marker = &mut lines[dest_row + 1][2 * dest_col + 1];
        *marker = marker.to_ascii_lowercase();
        lines[row + 1][2 * col + 1] = if pass_loc == 4 { 'T' } else { 't' };
        lines
            .into_iter()
            .map(|l| l.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn action_label(&self, action: usize) -> String {
        Self::ACTIONS
            .get(action)
            .map(|label| label.to_string())
            .unwrap_or_else(|| action.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_and_decode_agree() {
        for state in 0..N_STATES {
            let (r, c, p, d) = TaxiEnv::decode(state);
            assert_eq!(TaxiEnv::encode(r, c, p, d), state);
        }
    }

    #[test]
    fn reset_starts_with_waiting_passenger() {
        let mut env = TaxiEnv::new(3);
        for _ in 0..50 {
            let (_, _, pass_loc, dest_loc) = TaxiEnv::decode(env.reset());
            assert!(pass_loc < 4);
            assert_ne!(pass_loc, dest_loc);
        }
    }

    #[test]
    fn illegal_pickup_is_penalised() {
        let env = TaxiEnv::new(0);
        // taxi at (2, 2), passenger waiting at R, destination G
        let state = TaxiEnv::encode(2, 2, 0, 1);
        let outcome = env.transitions(state, 4).unwrap()[0];
        assert_eq!(outcome.reward, -10.0);
        assert_eq!(outcome.next_state, state);
        assert!(!outcome.terminated);
    }

    #[test]
    fn delivery_terminates_with_reward() {
        let env = TaxiEnv::new(0);
        // passenger in taxi, taxi parked on G which is the destination
        let state = TaxiEnv::encode(0, 4, 4, 1);
        let outcome = env.transitions(state, 5).unwrap()[0];
        assert_eq!(outcome.reward, 20.0);
        assert!(outcome.terminated);
    }

    #[test]
    fn walls_block_movement() {
        let env = TaxiEnv::new(0);
        // wall between columns 1 and 2 on the top row
        let state = TaxiEnv::encode(0, 1, 0, 1);
        let outcome = env.transitions(state, 2).unwrap()[0];
        assert_eq!(outcome.next_state, state);
        assert_eq!(outcome.reward, -1.0);
    }

    #[test]
    fn step_requires_reset() {
        let mut env = TaxiEnv::new(0);
        assert_eq!(env.step(0), Err(EnvError::NotReady));
    }

    #[test]
    fn out_of_range_action_is_rejected() {
        let mut env = TaxiEnv::new(0);
        env.reset();
        assert_eq!(
            env.step(6),
            Err(EnvError::InvalidAction { action: 6, size: 6 })
        );
    }

    #[test]
    fn render_mode_gates_the_map() {
        let mut env = TaxiEnv::new(0);
        env.reset();
        assert!(env.render().is_empty());
        env.set_render(true);
        let frame = env.render();
        assert_eq!(frame.lines().count(), TaxiEnv::MAP.len());
        assert!(frame.contains('t'));
        env.set_render(false);
        assert!(env.render().is_empty());
    }
}
