/**
 * Responsibility
 *  - リソースごとの「意味付きID型」を宣言する
 *
 * 置くもの
 *  - PetTag, NoteTag などのタグ型
 *  - type PublicPetId = PublicId<PetTag> のような alias
 */
use super::core::{IdTag, PublicId};

// pets
pub enum PetTag {}
impl IdTag for PetTag {
    const PARAM: &'static str = "pet_id";
}
pub type PublicPetId = PublicId<PetTag>;

// notes
pub enum NoteTag {}
impl IdTag for NoteTag {
    const PARAM: &'static str = "note_id";
}
pub type PublicNoteId = PublicId<NoteTag>;

// events
pub enum EventTag {}
impl IdTag for EventTag {
    const PARAM: &'static str = "event_id";
}
pub type PublicEventId = PublicId<EventTag>;
