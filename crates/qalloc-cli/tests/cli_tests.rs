//! CLI command parsing and input handling tests.
//!
//! The CLI is a binary crate, so argument parsing is tested on a mirror of
//! its clap structs and input handling through the library calls the
//! commands make.

// ============================================================================
// Architecture and input loading
// ============================================================================

mod input_loading {
    use std::fs;

    use qalloc_arch::ArchGraph;
    use qalloc_compile::{AllocatorBuilder, AllocatorKind, DependencySet, Program};

    #[test]
    fn test_builtin_names() {
        assert_eq!(ArchGraph::by_name("ibmqx2").unwrap().size(), 5);
        assert_eq!(ArchGraph::by_name("ring8").unwrap().size(), 8);
        assert!(ArchGraph::by_name("quantum_computer_9000").is_err());
    }

    #[test]
    fn test_arch_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("line.arch");
        fs::write(&path, "1 3\nq 3\nq[0] q[1]\nq[1] q[2]\n").unwrap();

        let graph = ArchGraph::from_file(&path).unwrap();
        assert_eq!(graph.size(), 3);
        assert!(graph.has_edge(1, 2));
    }

    #[test]
    fn test_dependency_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deps.txt");
        fs::write(&path, "# bell pair and fan-out\ncx 0 1\ncx 0 2\n").unwrap();

        let deps = DependencySet::parse(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(deps.len(), 2);
    }

    #[test]
    fn test_program_file_allocates() {
        let json = r#"{
            "num_qubits": 3,
            "num_clbits": 1,
            "statements": [
                {"name": "h", "qubits": [0]},
                {"name": "cx", "qubits": [0, 1]},
                {"name": "cx", "qubits": [1, 2]},
                {"name": "measure", "qubits": [2], "clbits": [0]}
            ]
        }"#;
        let program = Program::from_json(json).unwrap();

        let allocator = AllocatorBuilder::new()
            .with_allocator(AllocatorKind::Greedy)
            .build()
            .unwrap();
        let allocation = allocator
            .allocate_program(&ArchGraph::ibmqx4(), &program)
            .unwrap();

        assert_eq!(allocation.solution.op_seqs.len(), 2);
        let rendered = serde_json::to_value(&allocation).unwrap();
        assert_eq!(rendered["allocator"], "greedy");
        assert!(rendered["schedule"].is_array());
    }

    #[test]
    fn test_invalid_program() {
        assert!(Program::from_json(r#"{"circuit": "test"}"#).is_err());
    }
}

// ============================================================================
// Clap argument parsing (test via try_parse_from on equivalent structs)
// ============================================================================

mod clap_parsing {
    use clap::{Args, Parser, Subcommand};

    // Mirror the CLI struct for testing (since main.rs is a binary)
    #[derive(Parser)]
    #[command(name = "qalloc")]
    struct TestCli {
        #[arg(short, long, action = clap::ArgAction::Count, global = true)]
        verbose: u8,

        #[command(subcommand)]
        command: TestCommands,
    }

    #[derive(Args)]
    struct TestAllocateArgs {
        #[arg(short, long)]
        arch: String,
        #[arg(short, long)]
        input: String,
        #[arg(long)]
        allocator: Option<String>,
        #[arg(long)]
        mapping: Option<String>,
        #[arg(long)]
        swap_cost: Option<u32>,
        #[arg(long)]
        rev_cost: Option<u32>,
        #[arg(long)]
        lcx_cost: Option<u32>,
        #[arg(short, long)]
        config: Option<String>,
        #[arg(short, long, default_value = "table")]
        format: String,
        #[arg(long)]
        no_verify: bool,
    }

    #[derive(Subcommand)]
    enum TestCommands {
        Allocate(TestAllocateArgs),
        Swaps {
            #[arg(short, long)]
            arch: String,
            #[arg(long)]
            from: String,
            #[arg(long)]
            to: String,
        },
        Archs {
            #[arg(long)]
            show: Option<String>,
        },
        Version,
    }

    #[test]
    fn test_parse_allocate_minimal() {
        let cli =
            TestCli::try_parse_from(["qalloc", "allocate", "-a", "ibmqx2", "-i", "deps.txt"])
                .unwrap();
        match cli.command {
            TestCommands::Allocate(args) => {
                assert_eq!(args.arch, "ibmqx2");
                assert_eq!(args.input, "deps.txt");
                assert!(args.allocator.is_none());
                assert_eq!(args.format, "table");
                assert!(!args.no_verify);
            }
            _ => panic!("Expected Allocate command"),
        }
    }

    #[test]
    fn test_parse_allocate_with_all_args() {
        let cli = TestCli::try_parse_from([
            "qalloc",
            "allocate",
            "--arch",
            "ring6",
            "--input",
            "program.json",
            "--allocator",
            "path-guided",
            "--mapping",
            "identity",
            "--swap-cost",
            "3",
            "--rev-cost",
            "1",
            "--lcx-cost",
            "5",
            "--config",
            "qalloc.yaml",
            "--format",
            "json",
            "--no-verify",
        ])
        .unwrap();
        match cli.command {
            TestCommands::Allocate(args) => {
                assert_eq!(args.allocator.as_deref(), Some("path-guided"));
                assert_eq!(args.mapping.as_deref(), Some("identity"));
                assert_eq!(args.swap_cost, Some(3));
                assert_eq!(args.rev_cost, Some(1));
                assert_eq!(args.lcx_cost, Some(5));
                assert_eq!(args.config.as_deref(), Some("qalloc.yaml"));
                assert_eq!(args.format, "json");
                assert!(args.no_verify);
            }
            _ => panic!("Expected Allocate command"),
        }
    }

    #[test]
    fn test_parse_allocate_missing_input() {
        let result = TestCli::try_parse_from(["qalloc", "allocate", "--arch", "ibmqx2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_swaps() {
        let cli = TestCli::try_parse_from([
            "qalloc", "swaps", "-a", "ibmqx4", "--from", "0,1,2", "--to", "2,1,0",
        ])
        .unwrap();
        match cli.command {
            TestCommands::Swaps { arch, from, to } => {
                assert_eq!(arch, "ibmqx4");
                assert_eq!(from, "0,1,2");
                assert_eq!(to, "2,1,0");
            }
            _ => panic!("Expected Swaps command"),
        }
    }

    #[test]
    fn test_parse_archs_and_version() {
        let cli = TestCli::try_parse_from(["qalloc", "archs", "--show", "ring4"]).unwrap();
        assert!(matches!(cli.command, TestCommands::Archs { show: Some(_) }));

        let cli = TestCli::try_parse_from(["qalloc", "-vv", "version"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, TestCommands::Version));
    }

    #[test]
    fn test_unknown_subcommand() {
        assert!(TestCli::try_parse_from(["qalloc", "submit"]).is_err());
    }
}
