pub mod mapping;
pub mod phylo;
pub mod rate;
pub mod subst;

#[cfg(test)]
pub(crate) mod fixtures;
