/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and HUD updates.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    KeyCollected { index: usize, collected: usize, required: usize },
    QuestComplete,
    Interacted { npc: usize },
    DialogueOpened { npc: usize, line: String },
    DialogueAdvanced { npc: usize, index: usize, line: String },
    DialogueClosed { npc: usize },
}
