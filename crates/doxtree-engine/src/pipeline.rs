use doxtree_config::Options;
use rayon::prelude::*;

use crate::binding::{FileUnit, bind_file};
use crate::groups::GroupBuilder;
use crate::model::{DocumentationModel, FileId, SourceFile};
use crate::resolve::resolve;

/// Builds the resolved documentation model of a corpus.
///
/// Files are parsed and bound in parallel, folded into groups in the order
/// given, then resolved as a whole. Problems end up in
/// [`DocumentationModel::diagnostics`]; the run itself never fails.
pub fn build_model(files: &[SourceFile], options: &Options) -> DocumentationModel {
    let mut units: Vec<FileUnit> = files
        .par_iter()
        .enumerate()
        .map(|(idx, file)| bind_file(FileId(idx), file, options))
        .collect();
    // Fold order must not depend on which file finished first
    units.sort_by_key(|unit| unit.file);

    let mut builder = GroupBuilder::new(options);
    for unit in units {
        builder.fold(unit);
    }
    let mut model = builder.finish();

    let unresolved = resolve(&mut model);
    model.diagnostics.extend(unresolved);

    log::debug!(
        "built model: {} files, {} groups, {} symbols, {} diagnostics",
        model.files.len(),
        model.groups.len(),
        model.symbols.len(),
        model.diagnostics.len()
    );
    model
}
