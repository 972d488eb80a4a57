/// Possible simplification steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// `delta(mu, nu) * p(-mu) = p(nu)`
    /// `delta(mu, -mu) = dim`
    ContractIndices,

    /// `(x + 1)^2 - x^2 - 2*x = 1`
    Expand,

    /// `2*x*y + 4*x^2 = 2*x*(y + 2*x)`
    Factor,

    /// `a*x + b*x + c = c + x*(a + b)`
    Collect,
}
