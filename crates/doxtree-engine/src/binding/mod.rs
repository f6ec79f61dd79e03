//! # Symbol binding
//!
//! Decides what each comment of one file documents and flattens the file
//! into an ordered list of [`UnitEvent`]s. Binding needs nothing outside
//! its own file, so files bind in parallel; the group fold consumes the
//! events afterwards in file order.

use doxtree_config::Options;
use doxtree_syntax::{SyntaxError, normalize};
use relative_path::RelativePathBuf;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::model::{DocBlock, FileId, SourceFile, SymbolDecl};
use crate::parsing::{Directive, ParsedComment, parse_comment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOp {
    Define,
    AddTo,
}

/// One step of a file, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitEvent {
    Group {
        op: GroupOp,
        name: String,
        title: String,
        /// Explicit `@ingroup` parents.
        parents: Vec<String>,
        doc: Option<DocBlock>,
        line: usize,
    },
    /// `@{`, naming the group introduced by the same comment if any.
    ScopeOpen {
        group: Option<String>,
    },
    ScopeClose {
        line: usize,
    },
    /// Position of the `@file` command.
    FileMarker {
        ingroups: Vec<String>,
    },
    Declaration {
        decl: SymbolDecl,
        doc: Option<DocBlock>,
        ingroups: Vec<String>,
        line: usize,
    },
}

/// Everything one file contributes to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUnit {
    pub file: FileId,
    pub path: RelativePathBuf,
    pub includes: Vec<RelativePathBuf>,
    pub file_doc: Option<DocBlock>,
    pub events: Vec<UnitEvent>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Documentation headed for a symbol, with its `@ingroup` names.
type SymbolDoc = (Option<DocBlock>, Vec<String>);

struct Binder<'a> {
    path: &'a RelativePathBuf,
    options: &'a Options,
    events: Vec<UnitEvent>,
    file_doc: Option<DocBlock>,
    diagnostics: Vec<Diagnostic>,
}

/// Binds the comments of `source` to symbols, groups and the file itself.
///
/// A comment that cannot be tokenized makes the whole file unusable: the
/// unit comes back empty apart from an `UnparsableFile` diagnostic.
pub fn bind_file(file: FileId, source: &SourceFile, options: &Options) -> FileUnit {
    let mut binder = Binder {
        path: &source.path,
        options,
        events: vec![],
        file_doc: None,
        diagnostics: vec![],
    };

    let (events, file_doc, diagnostics) = match binder.bind(source) {
        Ok(()) => (binder.events, binder.file_doc, binder.diagnostics),
        Err((line, err)) => {
            log::warn!("{}:{line}: skipping file: {err}", source.path);
            let diagnostic = Diagnostic::new(DiagnosticKind::UnparsableFile {
                reason: err.to_string(),
            })
            .in_file(&source.path)
            .at_line(line);
            (vec![], None, vec![diagnostic])
        }
    };

    FileUnit {
        file,
        path: source.path.clone(),
        includes: source.includes.clone(),
        file_doc,
        events,
        diagnostics,
    }
}

impl Binder<'_> {
    fn bind(&mut self, source: &SourceFile) -> Result<(), (usize, SyntaxError)> {
        for entry in &source.entries {
            let mut pending: Option<SymbolDoc> = None;

            if let Some(raw) = &entry.preceding {
                let comment = normalize(raw, self.options.tab_width);
                let parsed = parse_comment(&comment, self.options).map_err(|e| (entry.line, e))?;
                if let Some(content) = self.route(parsed, entry.line) {
                    if comment.trailing {
                        // `///<` on its own line documents what came before it
                        self.attach_to_last(content, entry.line);
                    } else if entry.symbol.is_some() {
                        pending = Some(content);
                    } else if content.0.is_some() {
                        log::debug!(
                            "{}:{}: comment documents nothing; dropped",
                            self.path,
                            entry.line
                        );
                    }
                }
            }

            if let Some(decl) = &entry.symbol {
                let (doc, ingroups) = pending.unwrap_or_default();
                self.events.push(UnitEvent::Declaration {
                    decl: decl.clone(),
                    doc,
                    ingroups,
                    line: entry.line,
                });
            }

            if let Some(raw) = &entry.trailing {
                let comment = normalize(raw, self.options.tab_width);
                let parsed = parse_comment(&comment, self.options).map_err(|e| (entry.line, e))?;
                if let Some(content) = self.route(parsed, entry.line) {
                    self.attach_to_last(content, entry.line);
                }
            }
        }
        Ok(())
    }

    /// Emits the comment's group, scope and file events.
    ///
    /// Returns the documentation when it belongs to a symbol.
    fn route(&mut self, parsed: ParsedComment, line: usize) -> Option<SymbolDoc> {
        let for_group = parsed.documents_group();
        let for_file = parsed.documents_file() && !for_group;
        let ingroups = parsed.ingroups();
        let ParsedComment {
            doc,
            directives,
            diagnostics,
        } = parsed;

        self.diagnostics.extend(diagnostics.into_iter().map(|mut d| {
            d.line = Some(line + d.line.unwrap_or(0));
            d.in_file(self.path)
        }));

        let mut doc = (!doc.is_empty()).then_some(doc);
        let mut first_group = true;
        let mut last_group: Option<String> = None;

        for directive in directives {
            let (op, name, title) = match directive {
                Directive::DefGroup { name, title } => (GroupOp::Define, name, title),
                Directive::AddToGroup { name, title } => (GroupOp::AddTo, name, title),
                Directive::InGroup(_) => continue,
                Directive::ScopeOpen => {
                    self.events.push(UnitEvent::ScopeOpen {
                        group: last_group.clone(),
                    });
                    continue;
                }
                Directive::ScopeClose => {
                    self.events.push(UnitEvent::ScopeClose { line });
                    continue;
                }
                Directive::File => {
                    self.events.push(UnitEvent::FileMarker {
                        ingroups: if for_file { ingroups.clone() } else { vec![] },
                    });
                    continue;
                }
            };
            // The first group named in a comment is the one it documents
            let (parents, group_doc) = if first_group {
                (ingroups.clone(), doc.take())
            } else {
                (vec![], None)
            };
            first_group = false;
            last_group = Some(name.clone());
            self.events.push(UnitEvent::Group {
                op,
                name,
                title,
                parents,
                doc: group_doc,
                line,
            });
        }

        if for_group {
            return None;
        }
        if for_file {
            if let Some(doc) = doc {
                self.set_file_doc(doc, line);
            }
            return None;
        }
        Some((doc, ingroups))
    }

    fn set_file_doc(&mut self, doc: DocBlock, line: usize) {
        if self.file_doc.is_some() {
            self.diagnostics.push(
                Diagnostic::new(DiagnosticKind::DuplicateDocBlock {
                    subject: self.path.to_string(),
                })
                .in_file(self.path)
                .at_line(line),
            );
            return;
        }
        self.file_doc = Some(doc);
    }

    fn attach_to_last(&mut self, (new_doc, new_groups): SymbolDoc, line: usize) {
        let last = self
            .events
            .iter_mut()
            .rev()
            .find(|e| matches!(e, UnitEvent::Declaration { .. }));
        let Some(UnitEvent::Declaration {
            decl,
            doc,
            ingroups,
            ..
        }) = last
        else {
            log::debug!("{}:{line}: member comment with no declaration before it", self.path);
            return;
        };

        ingroups.extend(new_groups);
        let Some(new_doc) = new_doc else {
            return;
        };
        if doc.is_some() {
            self.diagnostics.push(
                Diagnostic::new(DiagnosticKind::DuplicateDocBlock {
                    subject: decl.name.clone(),
                })
                .in_file(self.path)
                .at_line(line),
            );
        } else {
            *doc = Some(new_doc);
        }
    }
}
