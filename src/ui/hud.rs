/// On-screen overlays around the map: key counter, quest banner,
/// dialogue box and the reward modal flag.
///
/// The HUD is written only from `GameEvent`s and host decisions. The
/// simulation never reads it back.

use crate::sim::event::GameEvent;

pub const COMPLETE_TEXT: &str = "Quest Complete!";

#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub key_counter: String,
    pub quest_banner: String,
    /// Text of the open dialogue box, `None` while hidden.
    pub dialogue: Option<String>,
    pub reward_modal: bool,
}

impl Hud {
    pub fn new(required: usize) -> Self {
        Hud {
            key_counter: counter_text(0, required),
            quest_banner: format!("Find the {} Golden Keys", required),
            dialogue: None,
            reward_modal: false,
        }
    }

    // ── Setters ──

    pub fn set_key_counter(&mut self, collected: usize, required: usize) {
        self.key_counter = counter_text(collected, required);
    }

    pub fn set_quest_banner(&mut self, text: &str) {
        self.quest_banner = text.to_string();
    }

    pub fn show_dialogue(&mut self, text: &str) {
        self.dialogue = Some(text.to_string());
    }

    pub fn hide_dialogue(&mut self) {
        self.dialogue = None;
    }

    pub fn show_reward_modal(&mut self) {
        self.reward_modal = true;
    }

    /// Apply one simulation event.
    pub fn apply(&mut self, event: &GameEvent) {
        match event {
            GameEvent::KeyCollected { collected, required, .. } => {
                self.set_key_counter(*collected, *required);
            }
            GameEvent::QuestComplete => self.set_quest_banner(COMPLETE_TEXT),
            GameEvent::DialogueOpened { line, .. }
            | GameEvent::DialogueAdvanced { line, .. } => self.show_dialogue(line),
            GameEvent::DialogueClosed { .. } => self.hide_dialogue(),
            GameEvent::Interacted { .. } => {}
        }
    }
}

fn counter_text(collected: usize, required: usize) -> String {
    format!("🔑 {}/{}", collected, required)
}
