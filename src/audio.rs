/// Audio collaborator. A terminal has no mixer, so each enabled cue class
/// rings the bell at most once per frame.

use std::io::Write;

use horde_survivor::config::AudioConfig;
use horde_survivor::entities::GameEvent;

const BELL: &str = "\x07";

fn wants_cue(config: &AudioConfig, event: &GameEvent) -> bool {
    match event {
        GameEvent::Shot => config.shot,
        GameEvent::ExpGained(_) => config.exp,
        GameEvent::AbilityGranted(_) | GameEvent::AbilityUsed(_) => config.ability,
        GameEvent::GameOver => config.game_over,
        _ => false,
    }
}

pub fn play_cues<W: Write>(
    out: &mut W,
    events: &[GameEvent],
    config: &AudioConfig,
) -> std::io::Result<()> {
    if events.iter().any(|e| wants_cue(config, e)) {
        out.write_all(BELL.as_bytes())?;
    }
    Ok(())
}
