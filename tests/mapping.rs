//! End-to-end tests: specification in, netlist/graph/bitstream out.

use std::collections::BTreeMap;

use vfpga::bitstream;
use vfpga::decompose::{decompose_term, NameGen};
use vfpga::error::Error;
use vfpga::literal::{Literal, Term};
use vfpga::mapper::{build_netlist, MapperConfig};
use vfpga::netlist::Lut;
use vfpga::resource::{LutClass, ResourcePool};
use vfpga::sop::SopSpec;
use vfpga::synth::Synthesis;
use vfpga::truth_table::TruthTable;

fn config(lut4: usize, lut6: usize) -> MapperConfig {
    MapperConfig::default().with_lut4(lut4).with_lut6(lut6)
}

fn assignment(names: &[String], mask: u32) -> BTreeMap<String, bool> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), mask >> i & 1 == 1))
        .collect()
}

// ─── Scenario ─────────────────────────────────────────────────────────────────

#[test]
fn three_term_scenario() {
    let spec = SopSpec::new().with_output(
        "X",
        vec![
            Term::from_names(&["a", "c"]),
            Term::from_names(&["a", "c", "b"]),
            Term::from_names(&["b", "d"]),
        ],
    );
    let synthesis = Synthesis::run(&spec, &config(100, 100)).unwrap();
    let netlist = &synthesis.netlist;

    assert_eq!(netlist.len(), 4);
    let last = netlist.len() - 1;
    let final_lut = &netlist.luts()[last];
    assert_eq!(final_lut.output(), "X");
    let term_outputs: Vec<&str> = netlist.luts()[..3].iter().map(|lut| lut.output()).collect();
    assert_eq!(final_lut.inputs(), term_outputs.as_slice());

    assert_eq!(synthesis.graph.num_edges(), 3);
    assert!(synthesis.graph.edges().all(|(_, consumer)| consumer == last));

    assert_eq!(synthesis.usage.lut4.used, 3);
    assert_eq!(synthesis.usage.lut4.available, 97);
    assert_eq!(synthesis.usage.lut6.used, 0);
}

// ─── Truth tables ─────────────────────────────────────────────────────────────

#[test]
fn truth_table_of_sop() {
    let tt = TruthTable::from_function("Z = a*b+c").unwrap();
    assert_eq!(tt.vars(), &["a", "b", "c"]);
    assert_eq!(tt.get(&[true, true, false]), Some(true));
    assert_eq!(tt.get(&[false, false, false]), Some(false));
    assert_eq!(tt.get(&[false, false, true]), Some(true));
    assert_eq!(tt.get(&[true, false, false]), Some(false));
    assert_eq!(tt.iter().count(), 8);
    for (bits, result) in tt.iter() {
        assert_eq!(result, (bits[0] && bits[1]) || bits[2]);
    }
}

// ─── Resources ────────────────────────────────────────────────────────────────

#[test]
fn empty_pool_always_fails() {
    for text in ["X=a*b", "X=!a", "X=a*b*c*d*e*f*g*h", "X=c+a*b"] {
        let spec = SopSpec::parse(text).unwrap();
        for _ in 0..3 {
            let result = Synthesis::run(&spec, &config(0, 0));
            assert!(
                matches!(result, Err(Error::ResourceExhausted { .. })),
                "{} should exhaust an empty pool",
                text
            );
        }
    }
}

#[test]
fn conservation_holds_after_build() {
    let spec = SopSpec::parse("X=a*b*c*d*e*f*g+a*b*c*d*e+h\nY=X*!a*b").unwrap();
    let (_, before, after) = build_netlist(&spec, &config(5, 2)).unwrap();
    for class in LutClass::ALL {
        assert_eq!(after.used(class) + after.available(class), after.total(class));
        assert!(after.available(class) <= before.available(class));
    }
    assert_eq!(after.used(LutClass::Lut6), 1);
}

#[test]
fn exhaustion_reports_chunk_and_pool() {
    // 11 literals: a LUT6 takes 6, then 6 remain and only a LUT4 may take them.
    let spec = SopSpec::parse("X=a*b*c*d*e*f*g*h*i*j*k").unwrap();
    match Synthesis::run(&spec, &config(0, 10)) {
        Err(Error::ResourceExhausted { chunk, pool }) => {
            assert_eq!(chunk, vec!["Int0", "g", "h", "i", "j", "k"]);
            assert_eq!(pool.lut4_available, 0);
            assert_eq!(pool.lut6_available, 9);
        }
        other => panic!("unexpected {:?}", other),
    }
}

// ─── Structure ────────────────────────────────────────────────────────────────

#[test]
fn every_literal_reaches_exactly_one_lut() {
    let spec = SopSpec::parse("X=a*c+a*c*b+b*d\nY=X*!d+e\nZ=p*q*r*s*t*u*v*w+!q").unwrap();
    let synthesis = Synthesis::run(&spec, &MapperConfig::default()).unwrap();
    let netlist = &synthesis.netlist;
    let reads = |lut: &Lut, name: &str| lut.inputs().iter().filter(|input| *input == name).count();

    for (output, terms) in spec.iter() {
        let terminal = &netlist.luts()[netlist.producer(output).unwrap()];
        for term in terms {
            let mut pool = ResourcePool::new(64, 32);
            let mut names = NameGen::new();
            let chain = decompose_term(term, &mut pool, &mut names).unwrap();
            if chain.luts.is_empty() {
                // A lone positive literal is wired straight into the terminal stage.
                let literal = &term.literals()[0];
                assert!(!literal.is_inverted());
                assert_eq!(chain.representative, literal.name());
                assert_eq!(reads(terminal, literal.name()), 1, "{} in {}", literal, output);
                continue;
            }
            for literal in term.literals() {
                let readers: usize = chain.luts.iter().map(|lut| reads(lut, literal.name())).sum();
                assert_eq!(readers, 1, "{} in term {} of {}", literal, term, output);
            }
        }
    }
}

#[test]
fn connectivity_matches_inputs() {
    let spec = SopSpec::parse("W=X*Y*Z+X*Z*a+X*Y\nX=a*c+a*c*b+b*d\nY=X*d\nZ=X*a+X*c*d").unwrap();
    let synthesis = Synthesis::run(&spec, &MapperConfig::default()).unwrap();
    let luts = synthesis.netlist.luts();
    let mut expected = 0;
    for (i, producer) in luts.iter().enumerate() {
        for (j, consumer) in luts.iter().enumerate() {
            let linked = consumer.inputs().iter().any(|name| name == producer.output());
            assert_eq!(synthesis.graph.contains(i, j), linked);
            expected += linked as usize;
        }
    }
    assert_eq!(synthesis.graph.num_edges(), expected);
}

#[test]
fn cyclic_outputs_are_rejected() {
    let spec = SopSpec::parse("A=B*x+y\nB=A*z").unwrap();
    match Synthesis::run(&spec, &MapperConfig::default()) {
        Err(Error::CyclicDependency { cycle }) => assert_eq!(cycle, vec!["A", "B", "A"]),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn identical_input_gives_identical_netlist() {
    let spec = SopSpec::parse("X=a*b*c*d*e*f*g+!h\nY=X*i+j*k").unwrap();
    let first = Synthesis::run(&spec, &config(8, 4)).unwrap();
    let second = Synthesis::run(&spec, &config(8, 4)).unwrap();
    assert_eq!(first.netlist, second.netlist);
    assert_eq!(first.encode().unwrap(), second.encode().unwrap());
}

#[test]
fn mapped_network_computes_the_sop() {
    let mut spec = SopSpec::parse("X=a*c+a*c*b+b*d\nY=X*!d\nZ=X*a+X*c*d+!a*!b*e*f*g*h*i").unwrap();
    spec.simplify();
    let synthesis = Synthesis::run(&spec, &MapperConfig::default()).unwrap();
    let inputs: Vec<String> = synthesis.primary_inputs.iter().cloned().collect();
    for mask in 0..(1u32 << inputs.len()) {
        let values = assignment(&inputs, mask);
        let expected = spec.eval(&values).unwrap();
        let actual = synthesis.netlist.simulate(&values).unwrap();
        for name in &synthesis.outputs {
            assert_eq!(actual[name], expected[name]);
        }
    }
}

// ─── Bitstream ────────────────────────────────────────────────────────────────

#[test]
fn bitstream_round_trip() {
    let spec = SopSpec::parse("X=a*c+a*c*b+b*d\nY=X*d\nZ=X*a+X*c*d\nW=X*Y*Z+X*Z*a+X*Y").unwrap();
    let synthesis = Synthesis::run(&spec, &MapperConfig::default()).unwrap();
    let bytes = synthesis.encode().unwrap();
    let (netlist, graph) = bitstream::decode(&bytes).unwrap();

    assert_eq!(netlist.len(), synthesis.netlist.len());
    for (original, restored) in synthesis.netlist.luts().iter().zip(netlist.luts()) {
        assert_eq!(original.inputs(), restored.inputs());
        assert_eq!(original.output(), restored.output());
        assert_eq!(original.function(), restored.function());
        assert_eq!(original.truth_table(), restored.truth_table());
    }
    assert_eq!(graph, synthesis.graph);
}

#[test]
fn bitstream_recomputes_truth_tables() {
    let not_a = Literal::negative("a");
    let spec = SopSpec::new().with_output("X", vec![Term::new([not_a, Literal::positive("b")])]);
    let synthesis = Synthesis::run(&spec, &MapperConfig::default()).unwrap();
    let bytes = synthesis.encode().unwrap();
    assert!(!String::from_utf8(bytes.clone()).unwrap().contains("truth"));
    let (netlist, _) = bitstream::decode(&bytes).unwrap();
    let tt = netlist.luts()[0].truth_table();
    assert_eq!(tt.get(&[false, true]), Some(true));
    assert_eq!(tt.count_ones(), 1);
}
