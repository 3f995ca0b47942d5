use super::mutator::package_name;
use super::{Context, Handler, Indexed, base_content, loose_images};
use crate::classify::Classification;
use crate::descriptor;
use crate::error::Result;
use crate::incoming::Incoming;
use crate::log::Severity;
use ua_content::{Details, VoiceDetails};

/// Indexes voice packs declared in `.int`/`.ucl` descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoiceHandler;

impl Handler for VoiceHandler {
    fn index(&self, ctx: &Context<'_>, incoming: &mut Incoming, classification: &Classification) -> Result<Indexed> {
        let Incoming { submission, files, log } = incoming;
        let mut content = base_content(submission, files, package_name(submission, files), classification);

        let mut voices: Vec<String> = Vec::new();
        for declaration in descriptor::declarations(files) {
            if let Some(voice) = declaration.voice()
                && !voices.iter().any(|v| v.eq_ignore_ascii_case(voice))
            {
                voices.push(voice.to_string());
            }
        }
        if voices.is_empty() {
            log.log(Severity::Continue, "No voice packs declared in descriptors");
        }

        let images = loose_images(ctx, files, log);
        content.details = Details::Voice(VoiceDetails { voices });
        Ok(Indexed { content, images })
    }
}
