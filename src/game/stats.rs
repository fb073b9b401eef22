//! Attempt statistics and end-of-attempt messages

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::session::SessionState;

/// Statistics sent to the client when an attempt ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptStats {
    pub attempts: u32,
    pub landings: u32,
    pub crashes: u32,
    pub highest_altitude: f64,
    pub win_rate: f64,
    pub loss_rate: f64,
}

impl AttemptStats {
    pub fn from_state(state: &SessionState) -> Self {
        let loss_rate = if state.attempts == 0 {
            0.0
        } else {
            f64::from(state.crashes) / f64::from(state.attempts)
        };
        let win_rate = if state.attempts == 0 { 0.0 } else { 1.0 - loss_rate };

        Self {
            attempts: state.attempts,
            landings: state.landings,
            crashes: state.crashes,
            highest_altitude: state.highest_altitude,
            win_rate,
            loss_rate,
        }
    }
}

/// Which table the closing message comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Victory,
    NoFuel,
    Death,
}

impl Ending {
    /// Pick the ending for a finished attempt
    pub fn for_state(state: &SessionState) -> Self {
        if state.health > 0.0 {
            Ending::Victory
        } else if state.fuel_mass <= 0.0 {
            Ending::NoFuel
        } else {
            Ending::Death
        }
    }

    fn table(&self) -> &'static [&'static str] {
        match self {
            Ending::Victory => VICTORY,
            Ending::NoFuel => NO_FUEL,
            Ending::Death => DEATH,
        }
    }

    /// Draw a message for this ending
    pub fn message<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let line = self.table().choose(rng).copied().unwrap_or_default();
        match self {
            Ending::Victory => line.to_string(),
            Ending::NoFuel | Ending::Death => format!("You {}", line),
        }
    }
}

const DEATH: &[&str] = &[
    "underestimated the moon’s hardness.",
    "found out that lunar gravity still hurts.",
    "mistook the surface for a trampoline.",
    "discovered that \"soft landing\" isn't subjective.",
    "forgot to pack a parachute.",
    "mistook a crater for a landing pad.",
    "thought the landing gear was optional.",
    "activated the eject button… a bit too late.",
    "learned that \"Aim for the stars\" is bad landing advice.",
    "tried to parallel park on the moon.",
    "got a little too enthusiastic with the thrusters.",
    "thought the moon would be more forgiving.",
    "just made a new crater on the moon.",
    "landed… just not successfully.",
    "mistook \"zero gravity\" for \"zero consequences.\"",
    "thought the spaceship could take a little scratch. It couldn't.",
    "discovered the moon’s bounce factor is… nonexistent.",
    "proved that the moon is not, in fact, made of cheese.",
    "braked a little too late.",
    "entered a low orbit. A very, very low orbit.",
    "fell from a high place.",
    "tried to swim in lunar dust.",
    "forgot to check altitude.",
    "miscalculated trajectory.",
    "was slain by physics.",
    "hit the ground too hard.",
    "thought \"autopilot\" meant \"autoland.\"",
    "attempted a moonwalk six feet under the surface.",
    "mixed up the gas and the brake pedals.",
    "learned that \"deceleration\" is not optional.",
    "found out that lunar dust is not as soft as it looks.",
    "forgot the landing gear.",
    "trusted the autopilot a little too much.",
    "discovered that the moon does, in fact, have gravity.",
    "thought that thrusters were just for show.",
    "mistook the eject button for the headlights.",
    "was just a little too ambitious with the landing speed.",
    "did a belly flop.",
    "landed at terminal velocity.",
    "became one with the lunar landscape.",
    "found out that craters are not soft.",
    "discovered the moon's surface is surprisingly solid.",
    "misjudged the stopping distance.",
    "thought the moon was made of cotton candy.",
    "learned a harsh lesson about lunar physics.",
    "went splat.",
    "wanted to see the inside of the moon.",
    "forgot to read the instructions.",
];

const NO_FUEL: &[&str] = &[
    "ran out of fuel.",
    "should have packed more gas.",
    "forgot to top off the tank.",
    "ran out of motivation, and fuel.",
    "should've paid more attention to the gas gauge.",
    "thought the lander could run on empty.",
    "wasted all the rocket fuel.",
    "drank all the fuel.",
    "thought the fuel tank was a drink cooler.",
];

const VICTORY: &[&str] = &["Victory!", "One small step for Wessel..."];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::physics::LanderSpec;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn rates_follow_crash_share() {
        let mut state = SessionState::new(&LanderSpec::default());
        state.attempts = 4;
        state.crashes = 1;
        state.landings = 3;

        let stats = AttemptStats::from_state(&state);

        assert_eq!(stats.loss_rate, 0.25);
        assert_eq!(stats.win_rate, 0.75);
    }

    #[test]
    fn rates_are_zero_without_attempts() {
        let stats = AttemptStats::from_state(&SessionState::new(&LanderSpec::default()));

        assert_eq!(stats.win_rate, 0.0);
        assert_eq!(stats.loss_rate, 0.0);
    }

    #[test]
    fn stats_serialize_in_camel_case() {
        let stats = AttemptStats::from_state(&SessionState::new(&LanderSpec::default()));
        let json = serde_json::to_value(&stats).unwrap();

        assert!(json.get("highestAltitude").is_some());
        assert!(json.get("winRate").is_some());
        assert!(json.get("lossRate").is_some());
    }

    #[test]
    fn ending_depends_on_health_then_fuel() {
        let mut state = SessionState::new(&LanderSpec::default());
        state.health = 40.0;
        state.fuel_mass = 0.0;
        assert_eq!(Ending::for_state(&state), Ending::Victory);

        state.health = 0.0;
        assert_eq!(Ending::for_state(&state), Ending::NoFuel);

        state.fuel_mass = 12.0;
        assert_eq!(Ending::for_state(&state), Ending::Death);
    }

    #[test]
    fn messages_come_from_the_right_table() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let victory = Ending::Victory.message(&mut rng);
        assert!(VICTORY.contains(&victory.as_str()));

        let no_fuel = Ending::NoFuel.message(&mut rng);
        let line = no_fuel.strip_prefix("You ").expect("prefixed");
        assert!(NO_FUEL.contains(&line));

        let death = Ending::Death.message(&mut rng);
        assert!(DEATH.contains(&death.strip_prefix("You ").unwrap()));
    }
}
