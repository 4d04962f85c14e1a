use log::debug;
use qdl_core::{DialogueTree, QdlError};
use qdl_parser::{count_sections, normalize};

mod builder;
mod options;
mod slots;
mod validate;

pub use builder::build_tree;
pub use options::CompileOptions;
pub use validate::validate_references;

/// Normalizes, counts and builds `source` into a dialogue tree.
pub fn compile(source: &str, options: &CompileOptions) -> Result<DialogueTree, QdlError> {
    options.validate()?;

    let normalized = normalize(source)?;
    let counts = count_sections(&normalized)?;
    let tree = build_tree(&normalized, &counts, options)?;

    if options.strict_references {
        validate_references(&tree)?;
    }

    tree.active_branch()?;
    debug!(
        "compiled \"{}\": {} branches, active \"{}\"",
        tree.title(),
        tree.branches().len(),
        tree.active_header()
    );
    Ok(tree)
}

#[cfg(test)]
mod compiler_test_support;

#[cfg(test)]
mod pipeline_tests {
    use super::compiler_test_support::*;
    use super::*;
    use qdl_core::DialogueCommand;

    #[test]
    fn compile_greeting_scenario() {
        let tree = compile_default(GREETING).expect("greeting should compile");
        assert_eq!(tree.title(), "Greeting");
        assert_eq!(tree.active_header(), "start");
        let object = &tree.active_branch().expect("active").objects()[0];
        assert_eq!(object.response(), "Bye");
        assert_eq!(object.commands(), &[DialogueCommand::Exit]);
        assert_eq!(object.args(), &[String::new()]);
    }

    #[test]
    fn command_list_before_any_response_is_nested() {
        let error = compile_default(r#"[Greeting]{"start""Hello."("Bye"(exit );)}"#)
            .expect_err("command list opened before a response");
        assert_eq!(error.code, "QDL_SYNTAX_NESTED");
        assert_eq!(error.index, Some(32));
        assert_eq!(error.unexpected, Some('('));
    }

    #[test]
    fn counted_sizes_match_built_tree() {
        let normalized = normalize(TAVERN).expect("normalize");
        let counts = count_sections(&normalized).expect("count");
        let tree = compile(TAVERN, &tavern_options()).expect("tavern should compile");

        assert_eq!(counts.branch_count(), tree.branches().len());
        for (b, branch) in tree.branches().iter().enumerate() {
            assert_eq!(counts.object_count(b), Some(branch.objects().len()));
            for (o, object) in branch.objects().iter().enumerate() {
                assert_eq!(counts.command_count(b, o), Some(object.commands().len()));
                assert_eq!(object.commands().len(), object.args().len());
            }
        }
    }

    #[test]
    fn syntax_errors_stop_before_building() {
        let error = compile_default(r#"[T]{"start""Hi.""Bye(exit ;)}"#)
            .expect_err("unterminated string");
        assert_eq!(error.code, "QDL_SYNTAX_UNTERMINATED");
        assert_eq!(error.index, Some(16));
    }

    #[test]
    fn strict_mode_rejects_dangling_goto_and_duplicate_headers() {
        let dangling = r#"[T]{"start""Hi.""Go"(goto nowhere;)}"#;
        compile_default(dangling).expect("permissive mode accepts dangling goto");
        let error = compile(dangling, &strict()).expect_err("strict mode");
        assert_eq!(error.code, "QDL_REF_DANGLING_GOTO");

        let duplicate = r#"[T]{"a""1""x"(goto a;)}{"a""2""y"()}"#;
        let tree = compile_default(duplicate).expect("permissive mode accepts duplicates");
        assert_eq!(tree.active_branch().expect("active").message(), "1");
        let error = compile(duplicate, &strict()).expect_err("strict mode");
        assert_eq!(error.code, "QDL_REF_DUPLICATE_HEADER");

        compile(TAVERN, &CompileOptions {
            strict_references: true,
            ..tavern_options()
        })
        .expect("tavern references resolve");
    }

    #[test]
    fn invalid_options_fail_before_parsing() {
        let error = compile(GREETING, &CompileOptions::with_host_commands(["goto"]))
            .expect_err("reserved host command");
        assert_eq!(error.code, "QDL_CONFIG_RESERVED_COMMAND");
    }
}
