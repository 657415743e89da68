use super::*;

/// Toy expression tree shaped like the evaluator's input: deeply nested unary
/// nodes around a leaf.
enum Node {
    Leaf(i64),
    Neg(Box<Node>),
}

fn eval(node: &Node) -> i64 {
    ensure_sufficient_stack(|| match node {
        Node::Leaf(n) => *n,
        Node::Neg(inner) => -eval(inner),
    })
}

fn nested(depth: usize) -> Node {
    let mut node = Node::Leaf(1);
    for _ in 0..depth {
        node = Node::Neg(Box::new(node));
    }
    node
}

fn drop_iteratively(mut node: Node) {
    while let Node::Neg(inner) = node {
        node = *inner;
    }
}

#[test]
fn test_shallow_tree() {
    let tree = nested(3);
    assert_eq!(eval(&tree), -1);
    drop_iteratively(tree);
}

#[test]
fn test_deep_tree_does_not_overflow() {
    let tree = nested(100_000);
    assert_eq!(eval(&tree), 1);
    drop_iteratively(tree);
}

#[test]
fn test_works_with_result_type() {
    let result: Result<i32, &str> = ensure_sufficient_stack(|| Err("not constant"));
    assert_eq!(result, Err("not constant"));
}

#[test]
#[cfg(not(target_arch = "wasm32"))]
fn test_remaining_stack_is_reported() {
    assert!(remaining_stack().is_some_and(|n| n > 0));
}
