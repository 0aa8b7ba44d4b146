mod curtain_state;

pub use curtain_state::CurtainStateRepository;
