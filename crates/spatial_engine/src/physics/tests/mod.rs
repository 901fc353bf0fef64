//! Multi-step collision scenarios exercising the manager end to end

mod collision_scenarios;
