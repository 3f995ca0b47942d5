use super::{Context, Handler, Indexed, base_content, loose_images};
use crate::classify::Classification;
use crate::descriptor;
use crate::error::Result;
use crate::incoming::{FileRole, FileSet, Incoming};
use crate::log::Severity;
use crate::submission::Submission;
use ua_content::{Details, MutatorDetails, MutatorInfo};

/// Indexes mutators declared in `.int`/`.ucl` descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutatorHandler;

impl Handler for MutatorHandler {
    fn index(&self, ctx: &Context<'_>, incoming: &mut Incoming, classification: &Classification) -> Result<Indexed> {
        let Incoming { submission, files, log } = incoming;
        let mut content = base_content(submission, files, package_name(submission, files), classification);

        let mut mutators: Vec<MutatorInfo> = Vec::new();
        for mutator in descriptor::declarations(files).iter().filter_map(|d| d.mutator()) {
            if !mutators.iter().any(|m| m.class.eq_ignore_ascii_case(&mutator.class)) {
                mutators.push(mutator);
            }
        }
        match mutators.as_slice() {
            [] => log.log(Severity::Continue, "No mutators declared in descriptors"),
            [only] => {
                content.title = only.name.clone();
                content.description = only.description.clone();
            },
            [first, ..] => content.description = first.description.clone(),
        }

        let images = loose_images(ctx, files, log);
        content.details = Details::Mutator(MutatorDetails { mutators });
        Ok(Indexed { content, images })
    }
}

/// Name of the first script package, else the first descriptor, else the
/// archive itself.
pub(crate) fn package_name(submission: &Submission, files: &FileSet) -> String {
    let code = files.of(&[FileRole::Code]);
    let descriptors = files.of(&[FileRole::Int]);
    code.first()
        .or(descriptors.first())
        .map(|f| f.base_name().to_string())
        .unwrap_or_else(|| submission.base_name())
}
