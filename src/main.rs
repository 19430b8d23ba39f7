/// Entry point and host loop.
///
/// The host owns everything with a side effect: terminal, audio,
/// gamepad, scheduler and the reward store. Each iteration drains input,
/// advances the scheduler clock, steps the simulation when a tick is due
/// and renders the current screen.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use sim::event::GameEvent;
use sim::save::RewardStore;
use sim::schedule::{self, Cue, Scheduler, TimerToken};
use sim::step;
use sim::world::GameState;
use ui::draw::{self, DrawCommand};
use ui::gamepad::GamepadState;
use ui::hud::Hud;
use ui::input::{self, KeyboardState, KEYS_CONFIRM, KEYS_EXPORT, KEYS_INTERACT, KEYS_QUIT};
use ui::renderer::{Renderer, Screen};
use ui::reward::RewardPrompt;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const KEYS_BACK: &[KeyCode] = &[KeyCode::Esc];

fn main() {
    let (config, config_err) = match GameConfig::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };
    init_logging(&config.log_file);
    if let Some(e) = config_err {
        log::warn!("{e}; using default settings");
    }

    let store = RewardStore::new(config.save_dir.as_deref());
    log::info!("reward directory: {}", store.dir().display());

    let mut renderer = Renderer::new();

    let enhanced = match renderer.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };
    log::info!("key release events: {}", if enhanced { "reported" } else { "timeout fallback" });

    let mut sound = SoundEngine::new(config.audio.volume);

    let result = game_loop(&mut renderer, &mut sound, &config, &store, enhanced);

    if let Some(sfx) = sound.as_mut() {
        sfx.stop_ambient_loop();
    }

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game error: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Key Quest!");
    if let Some(record) = store.retrieve() {
        println!("Saved number: {}", record.phone_number);
    }
}

/// Route `log` output to the configured file. The terminal is in raw mode,
/// so stderr would tear the screen.
fn init_logging(path: &Path) {
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Logging disabled: cannot open {}: {e}", path.display());
            return;
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

// ══════════════════════════════════════════════════════════════
// Screens
// ══════════════════════════════════════════════════════════════

/// One running session: simulation plus the overlays around it.
struct Run {
    state: GameState,
    hud: Hud,
    prompt: RewardPrompt,
    /// Delayed reward reveal, until it fires.
    reveal: Option<TimerToken>,
}

impl Run {
    fn new(config: &GameConfig) -> Self {
        Run {
            state: GameState::new(config),
            hud: Hud::new(config.quest.keys_required),
            prompt: RewardPrompt::new(),
            reveal: None,
        }
    }
}

enum Phase {
    Title,
    Playing(Box<Run>),
    Victory { number: String, message: Option<String> },
}

// ══════════════════════════════════════════════════════════════
// Host loop
// ══════════════════════════════════════════════════════════════

fn game_loop(
    renderer: &mut Renderer,
    sound: &mut Option<SoundEngine>,
    config: &GameConfig,
    store: &RewardStore,
    enhanced: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = KeyboardState::new();
    kb.honor_release = enhanced;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut scheduler = Scheduler::new();
    let mut phase = Phase::Title;

    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let mut last_tick = Instant::now();
    let mut clock = Instant::now();

    // A press seen between ticks is held here until the next step.
    let mut pending_interact = false;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        // ── Scheduler clock ──
        let elapsed = clock.elapsed().as_millis() as u64;
        clock += Duration::from_millis(elapsed);
        for cue in scheduler.advance(elapsed) {
            match cue {
                Cue::Tone { freq, secs, wave } => {
                    if let Some(sfx) = sound.as_ref() {
                        sfx.play_tone(freq, secs, wave);
                    }
                }
                Cue::RevealReward => {
                    if let Phase::Playing(run) = &mut phase {
                        run.reveal = None;
                        run.hud.show_reward_modal();
                        log::info!("reward prompt shown");
                    }
                }
            }
        }

        let back = kb.any_pressed(KEYS_BACK) || gp.cancel_pressed();
        let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
        let mut next: Option<Phase> = None;

        match &mut phase {
            Phase::Title => {
                if kb.any_pressed(KEYS_QUIT) || back {
                    break;
                }
                if confirm {
                    if config.audio.music {
                        if let Some(sfx) = sound.as_mut() {
                            sfx.start_ambient_loop();
                        }
                    }
                    log::info!("session started");
                    pending_interact = false;
                    last_tick = Instant::now();
                    next = Some(Phase::Playing(Box::new(Run::new(config))));
                }
            }

            Phase::Playing(run) => {
                if back {
                    cancel_reveal(run, &mut scheduler);
                    teardown(&mut scheduler, sound);
                    next = Some(Phase::Title);
                } else if run.hud.reward_modal {
                    let submitted = kb.strokes().find_map(|code| run.prompt.handle_key(code));
                    if let Some(number) = submitted {
                        next = Some(submit_reward(store, number));
                    }
                } else if !run.state.is_complete() {
                    pending_interact |= kb.any_pressed(KEYS_INTERACT) || gp.interact_pressed();

                    if last_tick.elapsed() >= tick_rate {
                        let mut frame_input = input::frame_input(&kb, &gp);
                        frame_input.interact_pressed |= pending_interact;
                        pending_interact = false;

                        let events = step::step(&mut run.state, frame_input);
                        dispatch_events(&events, run, &mut scheduler, sound.as_ref(), config);
                        last_tick = Instant::now();
                    }
                }
            }

            Phase::Victory { message, .. } => {
                if kb.any_pressed(KEYS_EXPORT) {
                    *message = Some(export_reward(store));
                } else if confirm || back {
                    teardown(&mut scheduler, sound);
                    next = Some(Phase::Title);
                }
            }
        }

        if let Some(p) = next {
            phase = p;
        }

        render_phase(renderer, &phase)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    teardown(&mut scheduler, sound);
    Ok(())
}

/// Forward simulation events to the HUD, the scheduler and the speakers.
fn dispatch_events(
    events: &[GameEvent],
    run: &mut Run,
    scheduler: &mut Scheduler,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) {
    for event in events {
        run.hud.apply(event);
        match event {
            GameEvent::KeyCollected { index, collected, required } => {
                log::info!("key {index} collected ({collected}/{required})");
                schedule::pickup_chime(scheduler);
            }
            GameEvent::QuestComplete => {
                log::info!("quest complete");
                run.reveal = Some(scheduler.schedule(config.quest.reward_delay_ms, Cue::RevealReward));
            }
            GameEvent::Interacted { .. } => {
                if let Some(sfx) = sound {
                    sfx.play_interact_effect();
                }
            }
            GameEvent::DialogueOpened { npc, .. } => log::debug!("dialogue opened with npc {npc}"),
            GameEvent::DialogueAdvanced { npc, index, .. } => {
                log::debug!("dialogue with npc {npc} at line {index}")
            }
            GameEvent::DialogueClosed { npc } => log::debug!("dialogue with npc {npc} closed"),
        }
    }
}

/// Withdraw a reward reveal that has not fired yet.
fn cancel_reveal(run: &mut Run, scheduler: &mut Scheduler) {
    if let Some(token) = run.reveal.take() {
        if scheduler.cancel(token) {
            log::info!("reward reveal cancelled");
        }
    }
}

/// End the session: drop pending cues and silence the music.
fn teardown(scheduler: &mut Scheduler, sound: &mut Option<SoundEngine>) {
    scheduler.cancel_all();
    if let Some(sfx) = sound.as_mut() {
        sfx.stop_ambient_loop();
    }
}

fn submit_reward(store: &RewardStore, number: String) -> Phase {
    match store.save(&number) {
        Ok(record) => Phase::Victory { number: record.phone_number, message: None },
        Err(e) => {
            log::error!("could not save reward: {e}");
            Phase::Victory { number, message: Some(format!("Save failed: {e}")) }
        }
    }
}

fn export_reward(store: &RewardStore) -> String {
    match store.export_as_file() {
        Ok(Some(path)) => format!("Exported to {}", path.display()),
        Ok(None) => "Nothing to export".to_string(),
        Err(e) => {
            log::error!("export failed: {e}");
            format!("Export failed: {e}")
        }
    }
}

fn render_phase(renderer: &mut Renderer, phase: &Phase) -> std::io::Result<()> {
    match phase {
        Phase::Title => renderer.render(&Screen::Title),
        Phase::Playing(run) => {
            let commands: Vec<DrawCommand> = draw::compose(&run.state, &run.hud);
            let prompt = run.hud.reward_modal.then(|| run.prompt.display());
            renderer.render(&Screen::Playing {
                commands: &commands,
                prompt: prompt.as_deref(),
            })
        }
        Phase::Victory { number, message } => renderer.render(&Screen::Victory {
            number,
            message: message.as_deref(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaving_before_the_reveal_cancels_it() {
        let config = GameConfig::default();
        let mut run = Run::new(&config);
        let mut scheduler = Scheduler::new();
        let events = [
            GameEvent::KeyCollected { index: 2, collected: 3, required: 3 },
            GameEvent::QuestComplete,
        ];
        dispatch_events(&events, &mut run, &mut scheduler, None, &config);
        assert!(run.reveal.is_some());

        cancel_reveal(&mut run, &mut scheduler);
        assert!(run.reveal.is_none());
        // The chime still plays out; the reveal never comes.
        let cues = scheduler.advance(config.quest.reward_delay_ms * 2);
        assert_eq!(cues.len(), 3);
        assert!(!cues.contains(&Cue::RevealReward));
    }

    #[test]
    fn reveal_token_is_kept_until_it_fires() {
        let config = GameConfig::default();
        let mut run = Run::new(&config);
        let mut scheduler = Scheduler::new();
        dispatch_events(&[GameEvent::QuestComplete], &mut run, &mut scheduler, None, &config);
        let token = run.reveal.expect("reveal scheduled");
        assert_eq!(scheduler.advance(config.quest.reward_delay_ms), vec![Cue::RevealReward]);
        assert!(!scheduler.cancel(token));
    }
}
