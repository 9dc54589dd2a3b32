pub mod fasteners;
pub mod plates;
pub mod sections;
pub mod turned;

pub use fasteners::{
    make_cross_screw, make_fasteners_hex_bolt, make_hex_bolt, make_hex_nut, make_hex_prism,
    make_screw_blank, make_slotted_screw, make_socket_head_screw,
};
pub use plates::{
    make_box, make_plate_with_hole, make_plate_with_pocket, make_plate_with_slot, make_tri_prism,
};
pub use sections::{make_flat_bar_2holes, make_l_bracket, make_rect_tube};
pub use turned::{
    make_cyl_with_hole, make_cylinder, make_drum_with_flange, make_flange, make_pipe,
    make_shaft_with_keyway, make_stepped_shaft, make_v_pulley,
};
