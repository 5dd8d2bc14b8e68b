//! End-to-end allocation scenarios on the IBM QX2 device.
//!
//! Each scenario runs every strategy through the allocator, which replays
//! the result before returning it.

use qalloc_arch::ArchGraph;
use qalloc_compile::{
    AllocError, AllocatorBuilder, AllocatorKind, CostModel, DepSolver, DependencySet,
    DynprogDepSolver, MappingFinder, MappingFinderKind, Operation, Program,
    WeightedMappingFinder, verify_solution,
};

fn fully_connectable() -> DependencySet {
    DependencySet::from_pairs([(2, 1), (2, 0), (1, 0), (4, 3), (4, 0), (3, 0)])
}

fn needs_one_swap() -> DependencySet {
    DependencySet::from_pairs([(0, 1), (0, 2), (1, 2), (4, 1), (4, 0)])
}

fn cost_of(kind: AllocatorKind, deps: &DependencySet) -> u32 {
    let allocator = AllocatorBuilder::new().with_allocator(kind).build().unwrap();
    let allocation = allocator.allocate(&ArchGraph::ibmqx2(), deps).unwrap();
    let replayed = allocation.verified_cost.unwrap();
    assert_eq!(
        replayed, allocation.solution.cost,
        "{kind}: replayed cost differs from reported cost"
    );
    allocation.solution.cost
}

#[test]
fn test_dynprog_finds_swap_free_placement() {
    let graph = ArchGraph::ibmqx2();
    let solution = DynprogDepSolver::new(CostModel::default())
        .solve(&graph, &fully_connectable())
        .unwrap();

    assert_eq!(solution.cost, 0);
    assert_eq!(solution.initial, vec![2, 1, 0, 4, 3]);
    assert_eq!(
        verify_solution(&graph, &fully_connectable(), &solution, &CostModel::default()).unwrap(),
        0
    );
}

#[test]
fn test_heuristics_on_swap_free_placement() {
    let graph = ArchGraph::ibmqx2();
    let mapping = WeightedMappingFinder.find(&graph, &fully_connectable()).unwrap();
    assert_eq!(mapping, vec![2, 0, 1, 3, 4]);

    for kind in [
        AllocatorKind::Greedy,
        AllocatorKind::PathGuided,
        AllocatorKind::Direct,
    ] {
        assert_eq!(cost_of(kind, &fully_connectable()), 8, "{kind}");
    }
}

#[test]
fn test_dynprog_single_swap() {
    let graph = ArchGraph::ibmqx2();
    let solution = DynprogDepSolver::new(CostModel::default())
        .solve(&graph, &needs_one_swap())
        .unwrap();

    assert_eq!(solution.cost, 11);
    assert_eq!(solution.initial, vec![0, 2, 1, 3, 4]);
    assert_eq!(solution.num_swaps(), 1);
    assert!(
        solution
            .op_seqs
            .iter()
            .all(|seq| !seq.ops.last().is_some_and(Operation::is_swap))
    );
}

#[test]
fn test_heuristics_on_single_swap() {
    let graph = ArchGraph::ibmqx2();
    let mapping = WeightedMappingFinder.find(&graph, &needs_one_swap()).unwrap();
    assert_eq!(mapping, vec![2, 0, 1, 4, 3]);

    assert_eq!(cost_of(AllocatorKind::Dynprog, &needs_one_swap()), 11);
    assert_eq!(cost_of(AllocatorKind::Greedy, &needs_one_swap()), 22);
    assert_eq!(cost_of(AllocatorKind::PathGuided, &needs_one_swap()), 22);
    assert_eq!(cost_of(AllocatorKind::Direct, &needs_one_swap()), 18);
}

#[test]
fn test_greedy_reports_replayed_cost() {
    let allocator = AllocatorBuilder::new()
        .with_allocator(AllocatorKind::Greedy)
        .build()
        .unwrap();
    for deps in [fully_connectable(), needs_one_swap()] {
        let allocation = allocator.allocate(&ArchGraph::ibmqx2(), &deps).unwrap();
        assert_eq!(allocation.verified_cost, Some(allocation.solution.cost));
        assert_eq!(allocation.schedule.map(|s| s.len()), Some(deps.len()));
    }
}

#[test]
fn test_path_guided_reports_stats() {
    let allocator = AllocatorBuilder::new()
        .with_allocator(AllocatorKind::PathGuided)
        .build()
        .unwrap();
    let allocation = allocator
        .allocate(&ArchGraph::ibmqx2(), &needs_one_swap())
        .unwrap();
    let stats = allocation.stats.unwrap();
    assert!(stats.total_swap_cost <= allocation.solution.cost);
}

#[test]
fn test_identity_mapping_option() {
    let allocator = AllocatorBuilder::new()
        .with_allocator(AllocatorKind::Direct)
        .with_mapping(MappingFinderKind::Identity)
        .build()
        .unwrap();
    let allocation = allocator
        .allocate(&ArchGraph::ibmqx2(), &fully_connectable())
        .unwrap();
    assert_eq!(allocation.solution.initial, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_program_through_every_strategy() {
    let mut program = Program::new(5, 2);
    program.gate("h", &[0]);
    program.cx(0, 1);
    program.cx(1, 2);
    program.barrier(&[0, 1, 2]);
    program.cx(3, 4);
    program.cx(4, 0);
    program.measure(0, 0);
    program.measure(4, 1);

    let graph = ArchGraph::ibmqx2();
    for kind in AllocatorKind::ALL {
        let allocator = AllocatorBuilder::new().with_allocator(kind).build().unwrap();
        let allocation = allocator.allocate_program(&graph, &program).unwrap();

        let mut call_points: Vec<_> = allocation
            .solution
            .op_seqs
            .iter()
            .map(|s| s.call_point)
            .collect();
        call_points.sort_unstable();
        assert_eq!(call_points, vec![1, 2, 4, 5], "{kind}");

        if kind == AllocatorKind::Greedy {
            assert_eq!(allocation.schedule.map(|s| s.len()), Some(program.len()));
        }
    }
}

#[test]
fn test_rejects_out_of_range_qubit() {
    let allocator = AllocatorBuilder::new().build().unwrap();
    let deps = DependencySet::from_pairs([(0, 5)]);
    assert!(matches!(
        allocator.allocate(&ArchGraph::ibmqx2(), &deps),
        Err(AllocError::QubitOutOfRange { qubit: 5, .. })
    ));
}

#[test]
fn test_parsed_dependencies() {
    let deps = DependencySet::parse("cx q[0], q[1]\ncx q[1], q[2]\n2 0\n").unwrap();
    assert_eq!(deps.len(), 3);
    // A directed 3-cycle has no native embedding on QX2, one gate is reversed.
    assert_eq!(cost_of(AllocatorKind::Dynprog, &deps), 4);
}
