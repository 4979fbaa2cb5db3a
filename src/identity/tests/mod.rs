mod helpers;
mod bootstrap_flow;
