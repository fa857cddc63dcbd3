//! End-to-end compliance matching over the public API.

use pretty_assertions::assert_eq;

use typefit::{DeclId, Error, Matcher, TypeComplianceEngine, TypeSpec, TypeStore};

/// A small class library:
///
/// ```text
/// Number;  Integer extends Number;  Long extends Number;  String
/// Comparable<T>
/// Collection<E>;  List<E> extends Collection<E>;  ArrayList<E> extends List<E>
/// StringList extends List<String>
/// ```
struct Fixture {
    store: TypeStore,
    number: DeclId,
    integer: DeclId,
    long: DeclId,
    string: DeclId,
    comparable: DeclId,
    collection: DeclId,
    list: DeclId,
    array_list: DeclId,
    string_list: DeclId,
}

fn fixture() -> Fixture {
    let mut store = TypeStore::new();
    let number = store.declare("Number", &[]).unwrap();
    let integer = store.declare("Integer", &[]).unwrap();
    let long = store.declare("Long", &[]).unwrap();
    let string = store.declare("String", &[]).unwrap();
    let comparable = store.declare("Comparable", &["T"]).unwrap();
    let collection = store.declare("Collection", &["E"]).unwrap();
    let list = store.declare("List", &["E"]).unwrap();
    let array_list = store.declare("ArrayList", &["E"]).unwrap();
    let string_list = store.declare("StringList", &[]).unwrap();

    store
        .add_supertype(integer, TypeSpec::class(number))
        .unwrap();
    store.add_supertype(long, TypeSpec::class(number)).unwrap();

    let list_e = TypeSpec::variable(&store, list, 0).unwrap();
    store
        .add_supertype(
            list,
            TypeSpec::parameterized(&store, collection, vec![list_e]).unwrap(),
        )
        .unwrap();
    let array_list_e = TypeSpec::variable(&store, array_list, 0).unwrap();
    store
        .add_supertype(
            array_list,
            TypeSpec::parameterized(&store, list, vec![array_list_e]).unwrap(),
        )
        .unwrap();
    store
        .add_supertype(
            string_list,
            TypeSpec::parameterized(&store, list, vec![TypeSpec::class(string)]).unwrap(),
        )
        .unwrap();

    Fixture {
        store,
        number,
        integer,
        long,
        string,
        comparable,
        collection,
        list,
        array_list,
        string_list,
    }
}

impl Fixture {
    fn of(&self, decl: DeclId, arg: TypeSpec) -> TypeSpec {
        TypeSpec::parameterized(&self.store, decl, vec![arg]).unwrap()
    }
}

#[test]
fn lenient_is_the_default() {
    let f = fixture();
    let engine = TypeComplianceEngine::new(&f.store);
    let pairs = [
        (TypeSpec::class(f.number), TypeSpec::class(f.integer)),
        (TypeSpec::class(f.integer), TypeSpec::class(f.number)),
        (
            f.of(f.list, TypeSpec::class(f.string)),
            TypeSpec::class(f.string_list),
        ),
        (
            TypeSpec::array(TypeSpec::class(f.number)),
            TypeSpec::array(TypeSpec::class(f.integer)),
        ),
    ];
    for (base, candidate) in &pairs {
        assert_eq!(
            engine.matches(base, candidate).unwrap(),
            engine.matches_with(base, candidate, false).unwrap(),
            "default mode differs for base {}",
            base.display(&f.store),
        );
    }
}

#[test]
fn strict_reflexivity_for_concrete_specs() {
    let f = fixture();
    let engine = TypeComplianceEngine::new(&f.store);
    let specs = [
        TypeSpec::class(f.integer),
        f.of(f.list, TypeSpec::class(f.integer)),
        TypeSpec::array(TypeSpec::array(TypeSpec::class(f.integer))),
        f.of(
            f.comparable,
            f.of(f.collection, TypeSpec::class(f.long)),
        ),
    ];
    for spec in &specs {
        assert!(
            engine.matches_with(spec, spec, true).unwrap(),
            "{} is not strictly reflexive",
            spec.display(&f.store),
        );
    }
}

#[test]
fn strict_success_implies_lenient_success() {
    let f = fixture();
    let engine = TypeComplianceEngine::new(&f.store);
    let specs = [
        TypeSpec::class(f.number),
        TypeSpec::class(f.integer),
        f.of(f.list, TypeSpec::class(f.number)),
        f.of(f.array_list, TypeSpec::class(f.number)),
        f.of(f.list, TypeSpec::wildcard_extends(vec![TypeSpec::class(f.number)])),
        TypeSpec::array(TypeSpec::class(f.integer)),
    ];
    for base in &specs {
        for candidate in &specs {
            if engine.matches_with(base, candidate, true).unwrap() {
                assert!(
                    engine.matches_with(base, candidate, false).unwrap(),
                    "strict match without lenient match for base {} candidate {}",
                    base.display(&f.store),
                    candidate.display(&f.store),
                );
            }
        }
    }
}

#[test]
fn argument_positions_are_invariant() {
    let f = fixture();
    let engine = TypeComplianceEngine::new(&f.store);

    let list_of_number = f.of(f.list, TypeSpec::class(f.number));
    let list_of_integer = f.of(f.list, TypeSpec::class(f.integer));

    // Integer is a subtype of Number, but List<Integer> is not usable as
    // List<Number>, nor the other way around.
    assert!(!engine.matches(&list_of_number, &list_of_integer).unwrap());
    assert!(!engine.matches(&list_of_integer, &list_of_number).unwrap());

    // The raw types still comply.
    assert!(engine
        .matches(&TypeSpec::class(f.list), &list_of_integer)
        .unwrap());
}

#[test]
fn wildcard_bounds_accept_subtypes() {
    let f = fixture();
    let engine = TypeComplianceEngine::new(&f.store);

    let extends_number = TypeSpec::wildcard_extends(vec![TypeSpec::class(f.number)]);
    assert!(engine
        .matches(&extends_number, &TypeSpec::class(f.integer))
        .unwrap());
    assert!(!engine
        .matches(&extends_number, &TypeSpec::class(f.string))
        .unwrap());

    // Inside an argument position.
    let list_extends_number = f.of(f.list, extends_number);
    assert!(engine
        .matches(&list_extends_number, &f.of(f.list, TypeSpec::class(f.integer)))
        .unwrap());
    assert!(!engine
        .matches(&list_extends_number, &f.of(f.list, TypeSpec::class(f.string)))
        .unwrap());

    // Plain Number at the same position stays invariant.
    let list_of_number = f.of(f.list, TypeSpec::class(f.number));
    assert!(!engine
        .matches(&list_of_number, &f.of(f.list, TypeSpec::class(f.integer)))
        .unwrap());
}

#[test]
fn lower_bounded_wildcards_accept_supertypes() {
    let f = fixture();
    let engine = TypeComplianceEngine::new(&f.store);

    let super_integer = TypeSpec::wildcard_super(vec![TypeSpec::class(f.integer)]);
    assert!(engine
        .matches(&super_integer, &TypeSpec::class(f.number))
        .unwrap());
    assert!(engine
        .matches(&super_integer, &TypeSpec::class(f.integer))
        .unwrap());
    assert!(!engine
        .matches(&super_integer, &TypeSpec::class(f.long))
        .unwrap());
}

#[test]
fn wildcard_containment() {
    let f = fixture();
    let engine = TypeComplianceEngine::new(&f.store);

    let extends_number = f.of(
        f.list,
        TypeSpec::wildcard_extends(vec![TypeSpec::class(f.number)]),
    );
    let extends_integer = f.of(
        f.list,
        TypeSpec::wildcard_extends(vec![TypeSpec::class(f.integer)]),
    );
    assert!(engine.matches(&extends_number, &extends_integer).unwrap());
    assert!(!engine.matches(&extends_integer, &extends_number).unwrap());

    let super_number = f.of(
        f.list,
        TypeSpec::wildcard_super(vec![TypeSpec::class(f.number)]),
    );
    let super_integer = f.of(
        f.list,
        TypeSpec::wildcard_super(vec![TypeSpec::class(f.integer)]),
    );
    assert!(engine.matches(&super_integer, &super_number).unwrap());
    assert!(!engine.matches(&super_number, &super_integer).unwrap());

    // The unbounded wildcard accepts any argument.
    let list_of_anything = f.of(f.list, TypeSpec::wildcard());
    assert!(engine
        .matches(&list_of_anything, &f.of(f.list, TypeSpec::class(f.string)))
        .unwrap());
    assert!(engine.matches(&list_of_anything, &extends_integer).unwrap());
}

#[test]
fn array_variance_policy() {
    let f = fixture();
    let engine = TypeComplianceEngine::new(&f.store);

    let number_array = TypeSpec::array(TypeSpec::class(f.number));
    let integer_array = TypeSpec::array(TypeSpec::class(f.integer));

    // The host rule: arrays are covariant leniently, invariant strictly.
    assert!(engine.matches(&number_array, &integer_array).unwrap());
    assert!(!engine
        .matches_with(&number_array, &integer_array, true)
        .unwrap());
    assert!(!engine.matches(&integer_array, &number_array).unwrap());

    // At an argument position the strict rule applies.
    assert!(!engine
        .matches(&f.of(f.list, number_array.clone()), &f.of(f.list, integer_array))
        .unwrap());
    assert!(engine
        .matches(&f.of(f.list, number_array.clone()), &f.of(f.list, number_array))
        .unwrap());
}

#[test]
fn arguments_resolve_through_the_inheritance_chain() {
    let f = fixture();
    let engine = TypeComplianceEngine::new(&f.store);

    let list_of_string = f.of(f.list, TypeSpec::class(f.string));
    let collection_of_string = f.of(f.collection, TypeSpec::class(f.string));
    let string_list = TypeSpec::class(f.string_list);

    // StringList is raw, but its declaration fixes List's E to String.
    assert!(engine.matches(&list_of_string, &string_list).unwrap());
    assert!(engine.matches(&collection_of_string, &string_list).unwrap());
    assert!(!engine
        .matches(&f.of(f.list, TypeSpec::class(f.number)), &string_list)
        .unwrap());

    // ArrayList<String> complies with Collection<String> one hop up.
    let array_list_of_string = f.of(f.array_list, TypeSpec::class(f.string));
    assert!(engine
        .matches(&collection_of_string, &array_list_of_string)
        .unwrap());

    // A raw candidate whose arguments stay open fails closed.
    assert!(!engine
        .matches(&list_of_string, &TypeSpec::class(f.array_list))
        .unwrap());
}

#[test]
fn nested_generic_arguments_reuse_the_same_matchers() {
    let f = fixture();
    let engine = TypeComplianceEngine::new(&f.store);

    // The parameterized logic runs at two nesting levels with different
    // base types; the wildcard at the innermost level stays lenient.
    let base = f.of(
        f.comparable,
        f.of(
            f.collection,
            f.of(
                f.comparable,
                TypeSpec::wildcard_extends(vec![TypeSpec::class(f.number)]),
            ),
        ),
    );
    let candidate = f.of(
        f.comparable,
        f.of(
            f.collection,
            f.of(f.comparable, TypeSpec::class(f.long)),
        ),
    );
    assert!(engine.matches(&base, &candidate).unwrap());

    let wrong = f.of(
        f.comparable,
        f.of(
            f.collection,
            f.of(f.comparable, TypeSpec::class(f.string)),
        ),
    );
    assert!(!engine.matches(&base, &wrong).unwrap());
}

#[test]
fn type_variables_enforce_their_bounds() {
    let mut f = fixture();
    let max = f.store.declare_method("max", &["T"]).unwrap();
    f.store
        .set_param_bounds(max, 0, vec![TypeSpec::class(f.number)])
        .unwrap();
    let t = TypeSpec::variable(&f.store, max, 0).unwrap();

    let engine = TypeComplianceEngine::new(&f.store);
    assert!(engine.matches(&t, &TypeSpec::class(f.integer)).unwrap());
    assert!(!engine.matches(&t, &TypeSpec::class(f.string)).unwrap());

    // Distinct variables never match strictly; an identical reference does.
    assert!(engine.matches_with(&t, &t, true).unwrap());
    assert!(!engine
        .matches_with(&t, &TypeSpec::class(f.integer), true)
        .unwrap());
}

#[test]
fn unknown_representations_fail_closed() {
    let f = fixture();
    let engine = TypeComplianceEngine::new(&f.store);

    let opaque = TypeSpec::opaque("union type");
    assert!(!engine.matches(&TypeSpec::class(f.number), &opaque).unwrap());
    assert!(!engine.matches(&opaque, &TypeSpec::class(f.number)).unwrap());
    assert!(!engine
        .matches(&TypeSpec::wildcard(), &opaque)
        .unwrap());
}

#[test]
fn malformed_input_is_an_error_not_a_mismatch() {
    let f = fixture();

    // Arity violations never construct.
    let err = TypeSpec::parameterized(&f.store, f.list, vec![]).unwrap_err();
    assert!(matches!(err, Error::ArityMismatch { expected: 1, found: 0, .. }));
    let err = TypeSpec::variable(&f.store, f.list, 3).unwrap_err();
    assert!(matches!(err, Error::ParamIndexOutOfRange { index: 3, .. }));

    // Specs from an unrelated store are rejected at match entry.
    let mut other = TypeStore::new();
    for i in 0..20 {
        other.declare(&format!("T{i}"), &[]).unwrap();
    }
    let foreign = TypeSpec::class(other.find("T19").unwrap());
    let engine = TypeComplianceEngine::new(&f.store);
    let err = engine.matches(&TypeSpec::class(f.number), &foreign).unwrap_err();
    assert!(matches!(err, Error::UnknownDeclaration(_)));
}

#[test]
fn mutually_recursive_bounds_hit_the_depth_limit() {
    let mut store = TypeStore::new();
    let string = store.declare("String", &[]).unwrap();
    let pair = store.declare_method("pair", &["T", "U"]).unwrap();
    let t = TypeSpec::variable(&store, pair, 0).unwrap();
    let u = TypeSpec::variable(&store, pair, 1).unwrap();
    store.set_param_bounds(pair, 0, vec![u]).unwrap();
    store.set_param_bounds(pair, 1, vec![t.clone()]).unwrap();

    let engine = TypeComplianceEngine::new(&store);
    let err = engine.matches(&t, &TypeSpec::class(string)).unwrap_err();
    assert!(matches!(err, Error::DepthExceeded { .. }));

    // The stack unwound cleanly; ordinary matching still works.
    assert!(engine
        .matches(&TypeSpec::class(string), &TypeSpec::class(string))
        .unwrap());
}
