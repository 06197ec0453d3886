//! Common source code fixtures for tests.

pub const COUNTER: &str = "node counter(x: int) returns (y: int)
let
  y = x + 1;
tel";

pub const COMMENTED_COUNTER: &str = "(* increments its input *)
node counter(x: int) returns (y: int)
let
  y = x + 1; (* done *)
tel";

pub const TYPES: &str = "type color = Red | Green | Blue
type point = { x : float; y : float }";

pub const AUTOMATON: &str = "node blink(x: bool) returns (y: bool)
let
  automaton
    state On
      do y = true
      until x then Off
    state Off
      do y = false
      until x then On
  end
tel";

pub const CONTROL: &str = "node control(c: bool; v: int) returns (o: int)
var last m: int = 0;
let
  reset
    o = if c then v else pre o;
    m = 0 fby o
  every c
tel";

/// `1+1+...+1` with `terms` operands.
pub fn long_sum(terms: usize) -> String {
    vec!["1"; terms].join("+")
}

/// `nodes` copies of a counter-like node `f<i>`, each with `equations`
/// equations `y = x + <j>;`.
pub fn many_nodes(nodes: usize, equations: usize) -> String {
    let body: String = (0..equations)
        .map(|j| format!("  y = x + {j};\n"))
        .collect();
    (0..nodes)
        .map(|i| format!("node f{i}(x: int) returns (y: int)\nlet\n{body}tel\n"))
        .collect()
}
