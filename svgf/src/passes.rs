mod compute_pass;

use log::debug;

pub use self::compute_pass::*;

macro_rules! passes {
    ([ $( $name:ident => $class:ident, )* ]) => {
        $( mod $name; )*
        $( pub use self::$name::*; )*

        #[derive(Debug)]
        pub struct DenoiserPasses {
            $( pub $name: $class, )*
        }

        impl DenoiserPasses {
            pub fn new() -> Self {
                debug!("Initializing denoiser passes");

                Self {
                    $( $name: $class::new(), )*
                }
            }
        }

        impl Default for DenoiserPasses {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

passes!([
    frame_denoising => FrameDenoisingPass,
    frame_reprojection => FrameReprojectionPass,
]);
